//! Fixtures shared by the repository tests

use analytics_core::{Snapshot, Snowflake};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::pool::create_memory_pool;

pub async fn memory_pool() -> SqlitePool {
    create_memory_pool().await.expect("in-memory database")
}

/// `days` after 2024-01-01 00:00 UTC
pub fn t(days: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(days)
}

pub fn snapshot(guild: u64, at: DateTime<Utc>, members: i64) -> Snapshot {
    Snapshot {
        id: None,
        guild_id: Snowflake::new(guild),
        guild_name: format!("Guild {guild}"),
        timestamp: at,
        member_count: members,
        channel_count: 5,
        text_channels: 3,
        voice_channels: 1,
        categories: 1,
        role_count: 4,
        bot_count: 1,
        booster_count: 2,
        is_auto: false,
    }
}
