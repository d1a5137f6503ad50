use analytics_core::Snowflake;
use analytics_service::{DemographicsService, GatewayFetchRequest, GatewayFetchResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use tracing::info;

use super::{authorize_body, authorize_header, GatewayError, GatewayResult};
use crate::server::GatewayState;

/// Fetch every member of a guild and store their demographics
///
/// POST /fetch_members
pub async fn fetch_members(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Result<Json<GatewayFetchRequest>, JsonRejection>,
) -> GatewayResult<Json<GatewayFetchResponse>> {
    authorize_header(&state, &headers)?;
    let Json(request) = body.map_err(|_| GatewayError::InvalidRequest)?;
    let guild_id = authorize_body(
        &state,
        request.token.as_deref(),
        request.guild_id.as_deref(),
    )?;

    let channel_hint = match request.channel_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(Snowflake::parse(raw).map_err(|_| GatewayError::InvalidChannel)?),
    };

    let outcome = DemographicsService::new(state.service_context())
        .fetch(state.source(), guild_id, channel_hint)
        .await
        .map_err(GatewayError::from_fetch)?;

    info!(
        guild_id = %guild_id,
        fetched = outcome.members_fetched,
        "Members fetched on dashboard request"
    );

    Ok(Json(GatewayFetchResponse {
        success: true,
        message: format!(
            "Successfully fetched {} members from {}",
            outcome.members_fetched, outcome.guild_name
        ),
        guild_name: outcome.guild_name,
        members_fetched: outcome.members_fetched,
        channel_id: Some(outcome.channel_id.to_string()),
    }))
}
