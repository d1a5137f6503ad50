//! # analytics-api
//!
//! Dashboard REST API built with Axum: read-only analytics queries, guild configuration,
//! and trigger endpoints forwarded to the bot gateway.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run};
pub use state::AppState;
