//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Guild not found or not accessible: {0}")]
    GuildNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("No snapshots recorded for guild {0}")]
    NoSnapshots(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid or inaccessible channel ID: {0}")]
    UnusableChannel(Snowflake),

    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: i64 },

    #[error("Unknown config field: {0}")]
    UnknownConfigField(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Unauthorized")]
    Unauthorized,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("No readable text channel available in guild {0}")]
    NoReadableChannel(Snowflake),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Stored data is malformed: {0}")]
    CorruptRecord(String),

    #[error("Guild source error: {0}")]
    SourceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::GuildNotFound(_) => "UNKNOWN_GUILD",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::NoSnapshots(_) => "NO_SNAPSHOTS",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::UnusableChannel(_) => "UNUSABLE_CHANNEL",
            Self::NotPositive { .. } => "NOT_POSITIVE",
            Self::TooLarge { .. } => "TOO_LARGE",
            Self::UnknownConfigField(_) => "UNKNOWN_CONFIG_FIELD",

            // Authorization
            Self::Unauthorized => "UNAUTHORIZED",

            // Business Rules
            Self::NoReadableChannel(_) => "NO_READABLE_CHANNEL",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CorruptRecord(_) => "CORRUPT_RECORD",
            Self::SourceError(_) => "GUILD_SOURCE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GuildNotFound(_) | Self::ChannelNotFound(_) | Self::NoSnapshots(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::UnusableChannel(_)
                | Self::NotPositive { .. }
                | Self::TooLarge { .. }
                | Self::UnknownConfigField(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
