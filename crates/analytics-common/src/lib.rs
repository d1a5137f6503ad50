//! # analytics-common
//!
//! Shared utilities including configuration, error handling, bearer-token authentication,
//! and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{bearer_matches, ApiToken};
pub use config::{
    AppConfig, AppSettings, CollectorConfig, ConfigError, CorsConfig, DatabaseConfig,
    Environment, LogFormat, ServerConfig, TriggerConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
