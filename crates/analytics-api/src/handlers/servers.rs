//! Per-guild dashboard views

use analytics_service::{
    CompareResponse, DaysQuery, DemographicsResponse, InsightService, QueryService,
    ServerSummary, SnapshotGroupQuery, SnapshotPoint, TrendResponse, DEFAULT_LOOKBACK_DAYS,
};
use axum::{extract::State, Json};
use serde_json::Value;

use crate::extractors::{GuildIdPath, SnowflakePath, ValidatedQuery};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Guilds with at least one snapshot
///
/// GET /api/servers
pub async fn list_servers(State(state): State<AppState>) -> ApiResult<Json<Vec<ServerSummary>>> {
    let servers = QueryService::new(state.service_context()).servers().await?;
    Ok(Json(servers))
}

/// Snapshot log, optionally grouped by day or week
///
/// GET /api/server/{guild_id}/snapshots?group=snapshot|day|week&days=N
pub async fn server_snapshots(
    State(state): State<AppState>,
    SnowflakePath(path): SnowflakePath<GuildIdPath>,
    ValidatedQuery(query): ValidatedQuery<SnapshotGroupQuery>,
) -> ApiResult<Json<Vec<SnapshotPoint>>> {
    let guild_id = path.guild_id()?;
    let points = QueryService::new(state.service_context())
        .server_snapshots(guild_id, query.group.as_deref(), query.days)
        .await?;
    Ok(Json(points))
}

/// GET /api/server/{guild_id}/demographics
pub async fn server_demographics(
    State(state): State<AppState>,
    SnowflakePath(path): SnowflakePath<GuildIdPath>,
) -> ApiResult<Json<DemographicsResponse>> {
    let guild_id = path.guild_id()?;
    let response = QueryService::new(state.service_context())
        .demographics(guild_id)
        .await?;
    Ok(Json(response))
}

/// Headline numbers; an empty object when the guild has no snapshots
///
/// GET /api/server/{guild_id}/stats
pub async fn server_stats(
    State(state): State<AppState>,
    SnowflakePath(path): SnowflakePath<GuildIdPath>,
) -> ApiResult<Json<Value>> {
    let guild_id = path.guild_id()?;
    let stats = QueryService::new(state.service_context())
        .server_stats(guild_id)
        .await?;

    let body = match stats {
        Some(stats) => serde_json::to_value(stats).map_err(ApiError::internal)?,
        None => Value::Object(serde_json::Map::new()),
    };
    Ok(Json(body))
}

/// Linear growth projection
///
/// GET /api/server/{guild_id}/trend?days
pub async fn server_trend(
    State(state): State<AppState>,
    SnowflakePath(path): SnowflakePath<GuildIdPath>,
    ValidatedQuery(query): ValidatedQuery<DaysQuery>,
) -> ApiResult<Json<TrendResponse>> {
    let guild_id = path.guild_id()?;
    let response = InsightService::new(state.service_context())
        .trend(guild_id, query.days.unwrap_or(DEFAULT_LOOKBACK_DAYS))
        .await?;
    Ok(Json(response))
}

/// Current period against the one before it
///
/// GET /api/server/{guild_id}/compare?days
pub async fn server_compare(
    State(state): State<AppState>,
    SnowflakePath(path): SnowflakePath<GuildIdPath>,
    ValidatedQuery(query): ValidatedQuery<DaysQuery>,
) -> ApiResult<Json<CompareResponse>> {
    let guild_id = path.guild_id()?;
    let response = InsightService::new(state.service_context())
        .compare(guild_id, query.days.unwrap_or(DEFAULT_LOOKBACK_DAYS))
        .await?;
    Ok(Json(response))
}
