//! Shared-secret authentication extractor
//!
//! Checks `Authorization: Bearer <token>` against the configured API token.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::response::ApiError;
use crate::state::AppState;

/// Proof that the request carried the shared API token
#[derive(Debug, Clone, Copy)]
pub struct BearerAuth;

#[async_trait]
impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized)?;

        let app_state = AppState::from_ref(state);
        if !app_state.api_token().matches(bearer.token()) {
            tracing::warn!("Bearer token mismatch");
            return Err(ApiError::Unauthorized);
        }

        Ok(BearerAuth)
    }
}
