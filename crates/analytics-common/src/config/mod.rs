//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, CollectorConfig, ConfigError, CorsConfig, DatabaseConfig,
    Environment, LogFormat, ServerConfig, TriggerConfig,
};
