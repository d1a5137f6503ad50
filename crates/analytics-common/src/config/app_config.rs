//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::auth::ApiToken;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    /// Dashboard API listener
    pub api: ServerConfig,
    /// Trigger gateway listener (bot side)
    pub gateway: ServerConfig,
    pub database: DatabaseConfig,
    /// Shared secret for the trigger gateway and notifications
    pub api_token: ApiToken,
    pub trigger: TriggerConfig,
    pub collector: CollectorConfig,
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" | "text" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Listener configuration (dashboard API and trigger gateway)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SQLite database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Dashboard to bot bridging
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerConfig {
    /// Base URL of the trigger gateway as seen from the dashboard
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// Base URL of the dashboard API; enables auto-snapshot notifications when set
    #[serde(default)]
    pub dashboard_url: Option<String>,
    #[serde(default = "default_trigger_timeout_secs")]
    pub timeout_secs: u64,
}

impl TriggerConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Snapshot collection and sweep pacing
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Probability that guild activity triggers an auto-snapshot check
    #[serde(default = "default_sample_rate")]
    pub auto_sample_rate: f64,
    /// Pause after a snapshot in sweeps
    #[serde(default = "default_snapshot_delay_secs")]
    pub snapshot_delay_secs: u64,
    /// Pause after a member fetch in sweeps
    #[serde(default = "default_fetch_delay_secs")]
    pub fetch_delay_secs: u64,
}

impl CollectorConfig {
    #[must_use]
    pub fn snapshot_delay(&self) -> Duration {
        Duration::from_secs(self.snapshot_delay_secs)
    }

    #[must_use]
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_secs(self.fetch_delay_secs)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            auto_sample_rate: default_sample_rate(),
            snapshot_delay_secs: default_snapshot_delay_secs(),
            fetch_delay_secs: default_fetch_delay_secs(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "guild-analytics".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    5000
}

fn default_gateway_port() -> u16 {
    5500
}

fn default_database_url() -> String {
    "sqlite://analytics.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:5500".to_string()
}

fn default_trigger_timeout_secs() -> u64 {
    30
}

fn default_sample_rate() -> f64 {
    0.05
}

fn default_snapshot_delay_secs() -> u64 {
    5
}

fn default_fetch_delay_secs() -> u64 {
    10
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let env = var("APP_ENV")
            .and_then(|s| Environment::parse(&s))
            .unwrap_or_default();
        let log_format = match var("LOG_FORMAT") {
            Some(s) => LogFormat::parse(&s).ok_or(ConfigError::InvalidValue("LOG_FORMAT", s))?,
            None if env.is_production() => LogFormat::Json,
            None => LogFormat::Pretty,
        };

        let api_token = var("ANALYTICS_API_TOKEN")
            .map(ApiToken::new)
            .ok_or(ConfigError::MissingVar("ANALYTICS_API_TOKEN"))?;

        let auto_sample_rate: f64 = parse_or(&var, "AUTO_SNAPSHOT_SAMPLE_RATE", default_sample_rate())?;
        if !(0.0..=1.0).contains(&auto_sample_rate) {
            return Err(ConfigError::InvalidValue(
                "AUTO_SNAPSHOT_SAMPLE_RATE",
                auto_sample_rate.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: var("APP_NAME").unwrap_or_else(default_app_name),
                env,
                log_format,
            },
            api: ServerConfig {
                host: var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&var, "API_PORT", default_api_port())?,
            },
            gateway: ServerConfig {
                host: var("GATEWAY_HOST").unwrap_or_else(default_host),
                port: parse_or(&var, "GATEWAY_PORT", default_gateway_port())?,
            },
            database: DatabaseConfig {
                url: var("DATABASE_URL").unwrap_or_else(default_database_url),
                max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", default_max_connections())?,
            },
            api_token,
            trigger: TriggerConfig {
                gateway_url: var("ANALYTICS_GATEWAY_URL")
                    .unwrap_or_else(default_gateway_url)
                    .trim_end_matches('/')
                    .to_string(),
                dashboard_url: var("ANALYTICS_DASHBOARD_URL")
                    .map(|url| url.trim_end_matches('/').to_string()),
                timeout_secs: parse_or(&var, "TRIGGER_TIMEOUT_SECS", default_trigger_timeout_secs())?,
            },
            collector: CollectorConfig {
                auto_sample_rate,
                snapshot_delay_secs: parse_or(&var, "SWEEP_SNAPSHOT_DELAY_SECS", default_snapshot_delay_secs())?,
                fetch_delay_secs: parse_or(&var, "SWEEP_FETCH_DELAY_SECS", default_fetch_delay_secs())?,
            },
            cors: CorsConfig {
                allowed_origins: var("CORS_ALLOWED_ORIGINS")
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_or<T, V>(var: &V, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_token_is_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("ANALYTICS_API_TOKEN")));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("ANALYTICS_API_TOKEN", "secret")])).unwrap();
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.gateway.address(), "127.0.0.1:5500");
        assert_eq!(config.database.url, "sqlite://analytics.db?mode=rwc");
        assert_eq!(config.trigger.gateway_url, "http://127.0.0.1:5500");
        assert!(config.trigger.dashboard_url.is_none());
        assert_eq!(config.trigger.timeout(), Duration::from_secs(30));
        assert!((config.collector.auto_sample_rate - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.collector.snapshot_delay(), Duration::from_secs(5));
        assert_eq!(config.collector.fetch_delay(), Duration::from_secs(10));
        assert_eq!(config.app.log_format, LogFormat::Pretty);
        assert!(config.api_token.matches("secret"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ANALYTICS_API_TOKEN", "secret"),
            ("APP_ENV", "production"),
            ("API_PORT", "8080"),
            ("ANALYTICS_GATEWAY_URL", "http://bot:5500/"),
            ("ANALYTICS_DASHBOARD_URL", "http://dash:5000"),
            ("SWEEP_FETCH_DELAY_SECS", "0"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
        ]))
        .unwrap();
        assert_eq!(config.app.env, Environment::Production);
        assert_eq!(config.app.log_format, LogFormat::Json);
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.trigger.gateway_url, "http://bot:5500");
        assert_eq!(config.trigger.dashboard_url.as_deref(), Some("http://dash:5000"));
        assert_eq!(config.collector.fetch_delay_secs, 0);
        assert_eq!(config.cors.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[
            ("ANALYTICS_API_TOKEN", "secret"),
            ("API_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("API_PORT", _)));

        let err = AppConfig::from_lookup(lookup(&[
            ("ANALYTICS_API_TOKEN", "secret"),
            ("AUTO_SNAPSHOT_SAMPLE_RATE", "1.5"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("AUTO_SNAPSHOT_SAMPLE_RATE", _)));
    }
}
