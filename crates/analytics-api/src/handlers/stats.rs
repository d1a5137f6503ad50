//! Global counters and time series shown on the dashboard overview

use analytics_core::analysis::TimeSeries;
use analytics_core::{Snowflake, SnowflakeParseError};
use analytics_service::{
    CountResponse, GuildFilterQuery, MembersOverTimeQuery, QueryService, Stats24hResponse,
};
use axum::{
    extract::{Query, State},
    Json,
};

use crate::extractors::ValidatedQuery;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

fn guild_filter(
    parsed: Result<Option<Snowflake>, SnowflakeParseError>,
) -> ApiResult<Option<Snowflake>> {
    parsed.map_err(|_| ApiError::invalid_query("Invalid guild_id format"))
}

/// Number of stored snapshots
///
/// GET /api/total_snapshots?guild_id
pub async fn total_snapshots(
    State(state): State<AppState>,
    Query(query): Query<GuildFilterQuery>,
) -> ApiResult<Json<CountResponse>> {
    let guild_id = guild_filter(query.guild_id())?;
    let response = QueryService::new(state.service_context())
        .total_snapshots(guild_id)
        .await?;
    Ok(Json(response))
}

/// Snapshots per hour over the last 24 hours
///
/// GET /api/snapshots_24h?guild_id
pub async fn snapshots_24h(
    State(state): State<AppState>,
    Query(query): Query<GuildFilterQuery>,
) -> ApiResult<Json<TimeSeries>> {
    let guild_id = guild_filter(query.guild_id())?;
    let series = QueryService::new(state.service_context())
        .snapshots_24h(guild_id)
        .await?;
    Ok(Json(series))
}

/// Daily member counts
///
/// GET /api/members_over_time?days&guild_id
pub async fn members_over_time(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<MembersOverTimeQuery>,
) -> ApiResult<Json<TimeSeries>> {
    let guild_id = guild_filter(query.guild_id())?;
    let series = QueryService::new(state.service_context())
        .members_over_time(guild_id, query.days)
        .await?;
    Ok(Json(series))
}

/// Distinct members with demographics
///
/// GET /api/user_count?guild_id
pub async fn user_count(
    State(state): State<AppState>,
    Query(query): Query<GuildFilterQuery>,
) -> ApiResult<Json<CountResponse>> {
    let guild_id = guild_filter(query.guild_id())?;
    let response = QueryService::new(state.service_context())
        .user_count(guild_id)
        .await?;
    Ok(Json(response))
}

/// GET /api/membership_count?guild_id
pub async fn membership_count(
    State(state): State<AppState>,
    Query(query): Query<GuildFilterQuery>,
) -> ApiResult<Json<CountResponse>> {
    let guild_id = guild_filter(query.guild_id())?;
    let response = QueryService::new(state.service_context())
        .membership_count(guild_id)
        .await?;
    Ok(Json(response))
}

/// Totals with their change over the last 24 hours
///
/// GET /api/24hr_stats
pub async fn stats_24h(State(state): State<AppState>) -> ApiResult<Json<Stats24hResponse>> {
    let response = QueryService::new(state.service_context()).stats_24h().await?;
    Ok(Json(response))
}
