//! Route definitions
//!
//! Dashboard reads, configuration and bot triggers, all mounted under /api.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{config, health, members, servers, stats, triggers};
use crate::middleware::apply_read_timeout;
use crate::state::AppState;

/// Create the main API router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api", api_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(apply_read_timeout(
            Router::new()
                .merge(stats_routes())
                .merge(server_routes())
                .merge(config_routes()),
        ))
        .merge(trigger_routes())
}

/// Overview counters and series
fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/total_snapshots", get(stats::total_snapshots))
        .route("/snapshots_24h", get(stats::snapshots_24h))
        .route("/members_over_time", get(stats::members_over_time))
        .route("/user_count", get(stats::user_count))
        .route("/membership_count", get(stats::membership_count))
        .route("/24hr_stats", get(stats::stats_24h))
        .route("/search_user", get(members::search_user))
        .route("/user_history", get(members::user_history))
}

/// Per-guild views
fn server_routes() -> Router<AppState> {
    Router::new()
        .route("/servers", get(servers::list_servers))
        .route("/server/:guild_id/snapshots", get(servers::server_snapshots))
        .route("/server/:guild_id/demographics", get(servers::server_demographics))
        .route("/server/:guild_id/stats", get(servers::server_stats))
        .route("/server/:guild_id/trend", get(servers::server_trend))
        .route("/server/:guild_id/compare", get(servers::server_compare))
}

/// Guild configuration
fn config_routes() -> Router<AppState> {
    Router::new()
        .route("/server_configs", get(config::server_configs))
        .route("/update_config", post(config::update_config))
}

/// Bot triggers. Sweeps pace themselves and are left without a request timeout.
fn trigger_routes() -> Router<AppState> {
    Router::new()
        .route("/fetch_members/:guild_id", post(triggers::fetch_members))
        .route("/take_snapshot/:guild_id", post(triggers::take_snapshot))
        .route("/snapshot_all", post(triggers::snapshot_all))
        .route("/fetch_all", post(triggers::fetch_all))
        .route(
            "/auto_snapshot_notification",
            post(triggers::auto_snapshot_notification),
        )
}
