//! Gateway server setup
//!
//! Routes, state construction and the listener of the trigger API.

mod state;

pub use state::GatewayState;

use std::sync::Arc;

use analytics_common::{AppConfig, AppError};
use analytics_core::GuildSource;
use analytics_service::{HttpSnapshotNotifier, ServiceContext};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::handlers::{fetch_members, health_check, take_snapshot};

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/fetch_members", post(fetch_members))
        .route("/take_snapshot", post(take_snapshot))
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the store and wire the bot's guild source into a `GatewayState`.
///
/// When a dashboard URL is configured, automatic snapshots are announced to it.
pub async fn create_gateway_state(
    config: &AppConfig,
    source: Arc<dyn GuildSource>,
) -> Result<GatewayState, AppError> {
    tracing::info!(url = %config.database.url, "Opening analytics store...");
    let pool = analytics_db::create_pool(&(&config.database).into())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let mut service_context = ServiceContext::sqlite(&pool, config.collector.clone());
    if let Some(dashboard_url) = &config.trigger.dashboard_url {
        let notifier = HttpSnapshotNotifier::new(dashboard_url, config.api_token.clone())
            .map_err(|e| AppError::Config(format!("Failed to build notifier: {e}")))?;
        service_context = service_context.with_notifier(Arc::new(notifier));
        tracing::info!(%dashboard_url, "Auto snapshot notifications enabled");
    }

    Ok(GatewayState::new(
        Arc::new(service_context),
        source,
        config.api_token.clone(),
    ))
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    tracing::info!("Starting trigger gateway on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig, source: Arc<dyn GuildSource>) -> Result<(), AppError> {
    let addr = config.gateway.address();
    let state = create_gateway_state(&config, source).await?;
    run_server(create_app(state), &addr).await
}
