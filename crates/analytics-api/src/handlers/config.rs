//! Guild configuration endpoints

use analytics_service::{
    ConfigService, QueryService, ServerConfigResponse, SuccessResponse, UpdateConfigRequest,
};
use axum::{extract::State, Json};

use crate::extractors::ValidatedJson;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Configuration of every guild with snapshots
///
/// GET /api/server_configs
pub async fn server_configs(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ServerConfigResponse>>> {
    let configs = QueryService::new(state.service_context())
        .server_configs()
        .await?;
    Ok(Json(configs))
}

/// Set one configuration field
///
/// POST /api/update_config
pub async fn update_config(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UpdateConfigRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let (Some(guild_id), Some(field)) = (request.guild_id.as_deref(), request.field.as_deref())
    else {
        return Err(ApiError::invalid_query("Missing guild_id or field"));
    };

    ConfigService::new(state.service_context())
        .update(guild_id, field, &request.value)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}
