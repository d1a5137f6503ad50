//! Dashboard API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p analytics-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use analytics_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting analytics dashboard API...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        address = %config.api.address(),
        gateway = %config.trigger.gateway_url,
        "Configuration loaded"
    );

    analytics_api::run(config).await?;

    Ok(())
}
