//! Error handling and binding helpers for repositories

use analytics_core::{format_timestamp, CountWindow, DomainError, Snowflake};
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Optional guild filter as a bindable TEXT value
pub fn guild_param(guild_id: Option<Snowflake>) -> Option<String> {
    guild_id.map(|id| id.to_string())
}

/// `(since, before)` bounds for `(? IS NULL OR ts >= ?) AND (? IS NULL OR ts < ?)` filters
pub fn window_params(window: CountWindow) -> (Option<String>, Option<String>) {
    match window {
        CountWindow::All => (None, None),
        CountWindow::Since(at) => (Some(format_timestamp(at)), None),
        CountWindow::Before(at) => (None, Some(format_timestamp(at))),
    }
}
