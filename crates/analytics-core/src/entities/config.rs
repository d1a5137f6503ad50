//! Per-guild analytics configuration

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Guild configuration row. Defaults apply when no row exists yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildConfig {
    pub guild_id: Snowflake,
    pub auto_snapshot: bool,
    pub last_auto_snapshot: Option<DateTime<Utc>>,
    /// Set by the first capture and never overwritten
    pub first_snapshot_date: Option<DateTime<Utc>>,
    pub chart_style: String,
    pub snapshot_retention_days: i64,
    pub auto_snapshot_interval_hours: f64,
}

impl GuildConfig {
    pub const DEFAULT_CHART_STYLE: &'static str = "emoji";
    pub const DEFAULT_RETENTION_DAYS: i64 = 90;
    pub const DEFAULT_INTERVAL_HOURS: f64 = 20.0;
    pub const MAX_RETENTION_DAYS: i64 = 36_500;
    pub const MAX_INTERVAL_HOURS: f64 = 8_760.0;

    /// Default configuration for a guild that has none stored
    pub fn new(guild_id: Snowflake) -> Self {
        Self {
            guild_id,
            auto_snapshot: false,
            last_auto_snapshot: None,
            first_snapshot_date: None,
            chart_style: Self::DEFAULT_CHART_STYLE.to_string(),
            snapshot_retention_days: Self::DEFAULT_RETENTION_DAYS,
            auto_snapshot_interval_hours: Self::DEFAULT_INTERVAL_HOURS,
        }
    }

    /// Whether an automatic snapshot is due at `now`.
    ///
    /// True when none was ever taken, or when at least `auto_snapshot_interval_hours`
    /// (fractional) have elapsed since the last one. Does not look at `auto_snapshot`.
    pub fn should_auto_snapshot(&self, now: DateTime<Utc>) -> bool {
        match self.last_auto_snapshot {
            None => true,
            Some(last) => {
                let elapsed_hours = (now - last).num_milliseconds() as f64 / 3_600_000.0;
                elapsed_hours >= self.auto_snapshot_interval_hours
            }
        }
    }

    /// When the next automatic snapshot becomes due; `None` when never taken or out of range
    pub fn next_auto_snapshot(&self) -> Option<DateTime<Utc>> {
        let interval_ms = (self.auto_snapshot_interval_hours * 3_600_000.0).round() as i64;
        let interval = Duration::try_milliseconds(interval_ms)?;
        self.last_auto_snapshot?.checked_add_signed(interval)
    }

    /// Oldest timestamp kept under the retention policy.
    /// A retention reaching past the calendar keeps everything.
    pub fn retention_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_days(self.snapshot_retention_days)
            .and_then(|retention| now.checked_sub_signed(retention))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Apply a validated field update
    pub fn apply(&mut self, field: ConfigField) {
        match field {
            ConfigField::AutoSnapshot(enabled) => self.auto_snapshot = enabled,
            ConfigField::IntervalHours(hours) => self.auto_snapshot_interval_hours = hours,
            ConfigField::RetentionDays(days) => self.snapshot_retention_days = days,
            ConfigField::ChartStyle(style) => self.chart_style = style,
        }
    }
}

/// A single configurable field with its validated value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigField {
    AutoSnapshot(bool),
    IntervalHours(f64),
    RetentionDays(i64),
    ChartStyle(String),
}

impl ConfigField {
    /// Field names accepted by the configuration API
    pub const NAMES: [&'static str; 4] = [
        "auto_snapshot",
        "auto_snapshot_interval_hours",
        "snapshot_retention_days",
        "chart_style",
    ];

    /// Validate a `(field, value)` pair coming from an untyped source
    pub fn parse(field: &str, value: &Value) -> Result<Self, DomainError> {
        match field {
            "auto_snapshot" => Ok(Self::AutoSnapshot(truthy(value))),
            "auto_snapshot_interval_hours" => {
                let hours = number(value).ok_or(DomainError::NotPositive {
                    field: "auto_snapshot_interval_hours",
                })?;
                Self::interval_hours(hours)
            }
            "snapshot_retention_days" => {
                let days = number(value).ok_or(DomainError::NotPositive {
                    field: "snapshot_retention_days",
                })?;
                if days.fract() != 0.0 {
                    return Err(DomainError::ValidationError(
                        "snapshot_retention_days must be a whole number".to_string(),
                    ));
                }
                Self::retention_days(days as i64)
            }
            "chart_style" => match value {
                Value::String(s) if !s.trim().is_empty() => Ok(Self::ChartStyle(s.trim().to_string())),
                _ => Err(DomainError::ValidationError(
                    "chart_style must be a non-empty string".to_string(),
                )),
            },
            other => Err(DomainError::UnknownConfigField(other.to_string())),
        }
    }

    pub fn interval_hours(hours: f64) -> Result<Self, DomainError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(DomainError::NotPositive {
                field: "auto_snapshot_interval_hours",
            });
        }
        if hours > GuildConfig::MAX_INTERVAL_HOURS {
            return Err(DomainError::TooLarge {
                field: "auto_snapshot_interval_hours",
                max: GuildConfig::MAX_INTERVAL_HOURS as i64,
            });
        }
        Ok(Self::IntervalHours(hours))
    }

    pub fn retention_days(days: i64) -> Result<Self, DomainError> {
        if days <= 0 {
            return Err(DomainError::NotPositive {
                field: "snapshot_retention_days",
            });
        }
        if days > GuildConfig::MAX_RETENTION_DAYS {
            return Err(DomainError::TooLarge {
                field: "snapshot_retention_days",
                max: GuildConfig::MAX_RETENTION_DAYS,
            });
        }
        Ok(Self::RetentionDays(days))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AutoSnapshot(_) => "auto_snapshot",
            Self::IntervalHours(_) => "auto_snapshot_interval_hours",
            Self::RetentionDays(_) => "snapshot_retention_days",
            Self::ChartStyle(_) => "chart_style",
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "on" | "true" | "yes" | "enable" | "1"
        ),
        _ => false,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
