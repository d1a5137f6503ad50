//! Snapshot database model

use sqlx::FromRow;

/// SELECT list producing a [`SnapshotModel`]
pub const SNAPSHOT_COLUMNS: &str = r"
    id,
    guild_id,
    COALESCE(guild_name, '') AS guild_name,
    timestamp,
    COALESCE(member_count, 0) AS member_count,
    COALESCE(channel_count, 0) AS channel_count,
    COALESCE(text_channels, 0) AS text_channels,
    COALESCE(voice_channels, 0) AS voice_channels,
    COALESCE(categories, 0) AS categories,
    COALESCE(role_count, 0) AS role_count,
    COALESCE(bots, 0) AS bots,
    COALESCE(boosters, 0) AS boosters,
    COALESCE(is_auto, 0) AS is_auto
";

/// Database model for the snapshots table
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotModel {
    pub id: i64,
    pub guild_id: String,
    pub guild_name: String,
    pub timestamp: String,
    pub member_count: i64,
    pub channel_count: i64,
    pub text_channels: i64,
    pub voice_channels: i64,
    pub categories: i64,
    pub role_count: i64,
    pub bots: i64,
    pub boosters: i64,
    pub is_auto: i64,
}
