//! GuildConfig entity <-> model mapper

use analytics_core::{format_timestamp, DomainError, GuildConfig};

use super::{parse_id, parse_optional_time};
use crate::models::ServerConfigModel;

/// NULL columns fall back to the defaults
impl TryFrom<ServerConfigModel> for GuildConfig {
    type Error = DomainError;

    fn try_from(model: ServerConfigModel) -> Result<Self, Self::Error> {
        let defaults = GuildConfig::new(parse_id(&model.guild_id, "server_config.guild_id")?);
        Ok(GuildConfig {
            auto_snapshot: model.auto_snapshot.is_some_and(|v| v != 0),
            last_auto_snapshot: parse_optional_time(model.last_auto_snapshot.as_deref()),
            first_snapshot_date: parse_optional_time(model.first_snapshot_date.as_deref()),
            chart_style: model
                .chart_style
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.chart_style.clone()),
            snapshot_retention_days: model
                .snapshot_retention_days
                .filter(|d| *d > 0)
                .unwrap_or(defaults.snapshot_retention_days),
            auto_snapshot_interval_hours: model
                .auto_snapshot_interval_hours
                .filter(|h| *h > 0.0)
                .unwrap_or(defaults.auto_snapshot_interval_hours),
            ..defaults
        })
    }
}

/// Config values encoded for a full-row write
pub struct ConfigParams<'a> {
    pub guild_id: String,
    pub auto_snapshot: i64,
    pub last_auto_snapshot: Option<String>,
    pub first_snapshot_date: Option<String>,
    pub chart_style: &'a str,
    pub snapshot_retention_days: i64,
    pub auto_snapshot_interval_hours: f64,
}

impl<'a> ConfigParams<'a> {
    pub fn new(config: &'a GuildConfig) -> Self {
        Self {
            guild_id: config.guild_id.to_string(),
            auto_snapshot: i64::from(config.auto_snapshot),
            last_auto_snapshot: config.last_auto_snapshot.map(format_timestamp),
            first_snapshot_date: config.first_snapshot_date.map(format_timestamp),
            chart_style: &config.chart_style,
            snapshot_retention_days: config.snapshot_retention_days,
            auto_snapshot_interval_hours: config.auto_snapshot_interval_hours,
        }
    }
}
