//! Server setup and initialization
//!
//! Provides the application builder and server runner.

use std::sync::Arc;

use analytics_common::{AppConfig, AppError};
use analytics_db::create_pool;
use analytics_service::{ServiceContext, TriggerClient};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let router = apply_middleware(
        create_router(),
        &config.cors,
        config.app.env.is_production(),
    );
    router.with_state(state)
}

/// Open the store and the gateway client and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!(url = %config.database.url, "Opening analytics store...");
    let pool = create_pool(&(&config.database).into())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("Analytics store ready");

    let service_context = ServiceContext::sqlite(&pool, config.collector.clone());

    let trigger = TriggerClient::new(&config.trigger, config.api_token.clone())
        .map_err(|e| AppError::Config(format!("Failed to build gateway client: {e}")))?;
    info!(gateway = %config.trigger.gateway_url, "Bot gateway client ready");

    Ok(AppState::new(service_context, config, Arc::new(trigger)))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let state = create_app_state(config).await?;
    let app = create_app(state);
    run_server(app, &addr).await
}
