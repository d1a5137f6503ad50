//! Actions forwarded to the bot gateway, plus the bot's snapshot notices.
//!
//! Gateway failures keep their status: unreachable is 503, a timeout 504, and an
//! error answer from the gateway passes its own status through.

use analytics_service::{
    record_notification, FetchMembersResponse, FetchMembersTrigger, SnapshotNotification,
    SuccessResponse, SweepResponse, SweepService, TakeSnapshotResponse, TriggerService,
};
use axum::{extract::State, Json};
use tracing::info;

use crate::extractors::{BearerAuth, GuildIdPath, OptionalJson, SnowflakePath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Ask the bot to refresh a guild's demographics
///
/// POST /api/fetch_members/{guild_id}
pub async fn fetch_members(
    State(state): State<AppState>,
    SnowflakePath(path): SnowflakePath<GuildIdPath>,
    OptionalJson(body): OptionalJson<FetchMembersTrigger>,
) -> ApiResult<Json<FetchMembersResponse>> {
    let guild_id = path.guild_id()?;
    let channel_id = body.and_then(|b| b.channel_id);

    let response = TriggerService::new(state.trigger())
        .fetch_members(guild_id, channel_id.as_deref())
        .await?;
    Ok(Json(response))
}

/// Ask the bot for a manual snapshot
///
/// POST /api/take_snapshot/{guild_id}
pub async fn take_snapshot(
    State(state): State<AppState>,
    SnowflakePath(path): SnowflakePath<GuildIdPath>,
) -> ApiResult<Json<TakeSnapshotResponse>> {
    let guild_id = path.guild_id()?;
    let response = TriggerService::new(state.trigger())
        .take_snapshot(guild_id)
        .await?;
    Ok(Json(response))
}

/// Snapshot every configured guild, pausing between guilds
///
/// POST /api/snapshot_all
pub async fn snapshot_all(State(state): State<AppState>) -> ApiResult<Json<SweepResponse>> {
    info!("Snapshot sweep requested");
    let summary = SweepService::new(state.service_context())
        .snapshot_all(state.trigger())
        .await?;
    Ok(Json(summary.to_response()))
}

/// Fetch members of every configured guild, pausing between guilds
///
/// POST /api/fetch_all
pub async fn fetch_all(State(state): State<AppState>) -> ApiResult<Json<SweepResponse>> {
    info!("Member fetch sweep requested");
    let summary = SweepService::new(state.service_context())
        .fetch_all(state.trigger())
        .await?;
    Ok(Json(summary.to_response()))
}

/// Snapshot notice pushed by the bot
///
/// POST /api/auto_snapshot_notification
pub async fn auto_snapshot_notification(
    _auth: BearerAuth,
    ValidatedJson(notice): ValidatedJson<SnapshotNotification>,
) -> ApiResult<Json<SuccessResponse>> {
    let response = record_notification(&notice)?;
    Ok(Json(response))
}
