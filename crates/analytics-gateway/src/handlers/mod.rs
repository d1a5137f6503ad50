//! Trigger API handlers
//!
//! Both trigger routes require the shared token twice: in the `Authorization`
//! header and in the JSON body.

mod error;
mod fetch;
mod snapshot;

pub use error::{GatewayError, GatewayResult};
pub use fetch::fetch_members;
pub use snapshot::take_snapshot;

use analytics_common::bearer_matches;
use analytics_core::Snowflake;
use analytics_service::HealthResponse;
use axum::{
    http::{header, HeaderMap},
    Json,
};

use crate::server::GatewayState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok("Analytics gateway is running"))
}

/// Header check, run before the body is looked at
fn authorize_header(state: &GatewayState, headers: &HeaderMap) -> GatewayResult<()> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if bearer_matches(presented, state.token()) {
        Ok(())
    } else {
        tracing::warn!("Trigger request with a bad Authorization header");
        Err(GatewayError::Unauthorized)
    }
}

/// Body checks: the echoed token and a parseable guild id
fn authorize_body(
    state: &GatewayState,
    token: Option<&str>,
    guild_id: Option<&str>,
) -> GatewayResult<Snowflake> {
    let token_ok = token.is_some_and(|t| state.token().matches(t));
    match guild_id.map(Snowflake::parse) {
        Some(Ok(guild_id)) if token_ok => Ok(guild_id),
        _ => Err(GatewayError::InvalidRequest),
    }
}
