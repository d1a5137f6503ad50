//! Dashboard side of the trigger gateway

use std::time::Duration;

use analytics_common::{ApiToken, TriggerConfig};
use analytics_core::Snowflake;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::dto::{
    GatewayErrorBody, GatewayFetchRequest, GatewayFetchResponse, GatewaySnapshotRequest,
    GatewaySnapshotResponse,
};

/// Longest gateway error text kept when the body is not JSON
const MAX_ERROR_TEXT: usize = 100;

/// Failure talking to the bot gateway
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Cannot connect to bot gateway. Make sure the bot is running. ({0})")]
    Unreachable(String),

    #[error("Request to bot gateway timed out")]
    Timeout,

    /// The gateway answered with a non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected gateway response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TriggerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Unreachable(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

/// Remote control of the bot: snapshots and member fetches
#[async_trait]
pub trait BotTrigger: Send + Sync {
    async fn take_snapshot(
        &self,
        guild_id: Snowflake,
    ) -> Result<GatewaySnapshotResponse, TriggerError>;

    async fn fetch_members(
        &self,
        guild_id: Snowflake,
        channel_id: Option<Snowflake>,
    ) -> Result<GatewayFetchResponse, TriggerError>;
}

/// `reqwest` client for the gateway's `/take_snapshot` and `/fetch_members`
#[derive(Clone)]
pub struct TriggerClient {
    http: Client,
    base_url: String,
    token: ApiToken,
}

impl TriggerClient {
    pub fn new(config: &TriggerConfig, token: ApiToken) -> Result<Self, reqwest::Error> {
        Self::with_timeout(&config.gateway_url, token, config.timeout())
    }

    pub fn with_timeout(
        base_url: &str,
        token: ApiToken,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, TriggerError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Calling bot gateway");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.token.bearer_header())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<GatewayErrorBody>(&text) {
                Ok(body) => body.error,
                Err(_) => text.chars().take(MAX_ERROR_TEXT).collect(),
            };
            return Err(TriggerError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl BotTrigger for TriggerClient {
    #[instrument(skip(self))]
    async fn take_snapshot(
        &self,
        guild_id: Snowflake,
    ) -> Result<GatewaySnapshotResponse, TriggerError> {
        let body = GatewaySnapshotRequest {
            guild_id: Some(guild_id.to_string()),
            token: Some(self.token.expose().to_string()),
            manual: Some(true),
        };
        self.post("/take_snapshot", &body).await
    }

    #[instrument(skip(self))]
    async fn fetch_members(
        &self,
        guild_id: Snowflake,
        channel_id: Option<Snowflake>,
    ) -> Result<GatewayFetchResponse, TriggerError> {
        let body = GatewayFetchRequest {
            guild_id: Some(guild_id.to_string()),
            token: Some(self.token.expose().to_string()),
            channel_id: channel_id.map(|id| id.to_string()),
        };
        self.post("/fetch_members", &body).await
    }
}

impl std::fmt::Debug for TriggerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
