//! Test helpers for integration tests
//!
//! In-process requests through `tower::ServiceExt::oneshot`, and real servers on
//! ephemeral ports driven with `reqwest`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use analytics_api::{create_app, AppState};
use analytics_common::ApiToken;
use analytics_core::GuildSource;
use analytics_gateway::GatewayState;
use analytics_service::{BotTrigger, ServiceContext, TriggerClient};
use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use crate::fixtures::{test_config, TEST_TOKEN};

/// Dashboard app over `ctx`, forwarding triggers to `trigger`
pub fn dashboard_app(ctx: ServiceContext, trigger: Arc<dyn BotTrigger>) -> Router {
    let config = test_config("http://127.0.0.1:9");
    create_app(AppState::new(ctx, config, trigger))
}

/// Dashboard app whose gateway client talks to `gateway_url`
pub fn dashboard_app_for(ctx: ServiceContext, gateway_url: &str) -> Result<Router> {
    let config = test_config(gateway_url);
    let client = TriggerClient::new(&config.trigger, config.api_token.clone())?;
    Ok(create_app(AppState::new(ctx, config, Arc::new(client))))
}

/// Trigger gateway app over `ctx` and `source`
pub fn gateway_app(ctx: Arc<ServiceContext>, source: Arc<dyn GuildSource>) -> Router {
    analytics_gateway::create_app(GatewayState::new(ctx, source, ApiToken::new(TEST_TOKEN)))
}

/// Send one request through the router and decode the JSON body (`Null` when empty)
pub async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

/// POST with a JSON body and an optional bearer token
pub fn post_json<T: Serialize>(uri: &str, body: &T, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).expect("serializable")))
        .expect("request")
}

/// POST without a body
pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

/// A router served on an ephemeral local port
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(app: Router) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    pub async fn post(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).send().await?)
    }

    pub async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }
}

/// Address nobody listens on
pub async fn closed_port_url() -> Result<String> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: reqwest::StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}
