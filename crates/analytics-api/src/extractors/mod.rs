//! Axum extractors for request handling
//!
//! Custom extractors for bearer authentication, path IDs and validated input.

mod auth;
mod path;
mod validated;

pub use auth::BearerAuth;
pub use path::{GuildIdPath, SnowflakePath};
pub use validated::{OptionalJson, ValidatedJson, ValidatedQuery};
