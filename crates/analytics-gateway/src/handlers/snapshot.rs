use analytics_core::format_timestamp;
use analytics_service::{CollectorService, GatewaySnapshotRequest, GatewaySnapshotResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use tracing::info;

use super::{authorize_body, authorize_header, GatewayError, GatewayResult};
use crate::server::GatewayState;

/// Capture a manual snapshot of a guild.
///
/// Automatic snapshots only come from the bot's own activity hook, which holds the
/// interval claim; `manual: false` in the body does not change that.
///
/// POST /take_snapshot
pub async fn take_snapshot(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Result<Json<GatewaySnapshotRequest>, JsonRejection>,
) -> GatewayResult<Json<GatewaySnapshotResponse>> {
    authorize_header(&state, &headers)?;
    let Json(request) = body.map_err(|_| GatewayError::InvalidRequest)?;
    let guild_id = authorize_body(
        &state,
        request.token.as_deref(),
        request.guild_id.as_deref(),
    )?;

    let guild = state
        .source()
        .guild(guild_id)
        .await
        .map_err(|e| GatewayError::SnapshotFailed(e.to_string()))?
        .ok_or(GatewayError::GuildNotFound)?;

    let snapshot = CollectorService::new(state.service_context())
        .capture(&guild, false)
        .await
        .map_err(|e| GatewayError::SnapshotFailed(e.to_string()))?;

    info!(guild_id = %guild_id, members = snapshot.member_count, "Snapshot taken on dashboard request");

    Ok(Json(GatewaySnapshotResponse {
        success: true,
        guild_name: snapshot.guild_name,
        member_count: snapshot.member_count,
        timestamp: format_timestamp(snapshot.timestamp),
    }))
}
