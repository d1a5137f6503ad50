//! Posts auto-snapshot notices to the dashboard

use std::time::Duration;

use analytics_common::ApiToken;
use analytics_core::{format_timestamp, DomainError, RepoResult, Snapshot, SnapshotNotifier};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::instrument;

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// `SnapshotNotifier` calling `POST {dashboard}/api/auto_snapshot_notification`
#[derive(Clone)]
pub struct HttpSnapshotNotifier {
    http: Client,
    url: String,
    token: ApiToken,
}

impl HttpSnapshotNotifier {
    pub fn new(dashboard_url: &str, token: ApiToken) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(NOTIFY_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: format!(
                "{}/api/auto_snapshot_notification",
                dashboard_url.trim_end_matches('/')
            ),
            token,
        })
    }
}

#[async_trait]
impl SnapshotNotifier for HttpSnapshotNotifier {
    #[instrument(skip(self, snapshot), fields(guild_id = %snapshot.guild_id))]
    async fn snapshot_taken(&self, snapshot: &Snapshot) -> RepoResult<()> {
        let body = json!({
            "guild_id": snapshot.guild_id,
            "guild_name": snapshot.guild_name,
            "member_count": snapshot.member_count,
            "timestamp": format_timestamp(snapshot.timestamp),
            "is_auto": snapshot.is_auto,
        });

        let response = self
            .http
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, self.token.bearer_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::InternalError(format!("notification failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DomainError::InternalError(format!(
                "dashboard rejected notification with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for HttpSnapshotNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSnapshotNotifier")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
