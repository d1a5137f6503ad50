//! Member search

use analytics_service::{
    MemberSearchResult, QueryService, SearchResponse, SearchUserQuery, UserHistoryQuery,
};
use axum::{
    extract::{Query, State},
    Json,
};

use crate::extractors::ValidatedQuery;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Paginated substring search over member names
///
/// GET /api/search_user?q&guild_id&limit&offset
pub async fn search_user(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SearchUserQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let guild_id = query
        .guild_id()
        .map_err(|_| ApiError::invalid_query("Invalid guild_id format"))?;

    let response = QueryService::new(state.service_context())
        .search(&query.q, guild_id, query.limit(), query.offset())
        .await?;
    Ok(Json(response))
}

/// Every guild a member has been recorded in
///
/// GET /api/user_history?member_id
pub async fn user_history(
    State(state): State<AppState>,
    Query(query): Query<UserHistoryQuery>,
) -> ApiResult<Json<Vec<MemberSearchResult>>> {
    let member_id = query
        .member_id()
        .map_err(|_| ApiError::invalid_query("Invalid member_id format"))?
        .ok_or_else(|| ApiError::invalid_query("Missing member_id"))?;

    let history = QueryService::new(state.service_context())
        .user_history(member_id)
        .await?;
    Ok(Json(history))
}
