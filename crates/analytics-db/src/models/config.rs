//! Server configuration database model

use sqlx::FromRow;

/// Database model for the server_config table. Every column may be NULL in older files.
#[derive(Debug, Clone, FromRow)]
pub struct ServerConfigModel {
    pub guild_id: String,
    pub auto_snapshot: Option<i64>,
    pub last_auto_snapshot: Option<String>,
    pub first_snapshot_date: Option<String>,
    pub chart_style: Option<String>,
    pub snapshot_retention_days: Option<i64>,
    pub auto_snapshot_interval_hours: Option<f64>,
}
