//! Trigger API errors
//!
//! Rendered as `{success: false, error}` with the status the dashboard relays.

use analytics_core::DomainError;
use analytics_service::{GatewayErrorBody, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid request data")]
    InvalidRequest,

    #[error("Guild not found or not accessible")]
    GuildNotFound,

    #[error("Invalid or inaccessible channel ID.")]
    InvalidChannel,

    #[error("Failed to automatically choose channels; please specify them manually")]
    NoReadableChannel,

    #[error("Failed to fetch members: {0}")]
    FetchFailed(String),

    #[error("Failed to take snapshot: {0}")]
    SnapshotFailed(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest | Self::InvalidChannel => StatusCode::BAD_REQUEST,
            Self::GuildNotFound => StatusCode::NOT_FOUND,
            Self::NoReadableChannel | Self::FetchFailed(_) | Self::SnapshotFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Classify a failed member fetch
    pub(crate) fn from_fetch(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(DomainError::GuildNotFound(_)) => Self::GuildNotFound,
            ServiceError::Domain(DomainError::UnusableChannel(_)) => Self::InvalidChannel,
            ServiceError::Domain(DomainError::NoReadableChannel(_)) => Self::NoReadableChannel,
            other => Self::FetchFailed(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Trigger request failed");
        }

        let body = GatewayErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use analytics_core::Snowflake;

    #[test]
    fn test_fetch_errors_are_classified() {
        let id = Snowflake::new(9);
        let cases = [
            (DomainError::GuildNotFound(id), StatusCode::NOT_FOUND),
            (DomainError::UnusableChannel(id), StatusCode::BAD_REQUEST),
            (DomainError::NoReadableChannel(id), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (domain, status) in cases {
            let err = GatewayError::from_fetch(ServiceError::Domain(domain));
            assert_eq!(err.status_code(), status);
        }

        let err = GatewayError::from_fetch(ServiceError::Domain(DomainError::SourceError(
            "rate limited".to_string(),
        )));
        assert!(err.to_string().starts_with("Failed to fetch members: "));
    }

    #[test]
    fn test_channel_message() {
        assert_eq!(
            GatewayError::InvalidChannel.to_string(),
            "Invalid or inaccessible channel ID."
        );
    }
}
