//! Snapshot entity - one point-in-time measurement of a guild

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::guild_state::GuildState;
use crate::value_objects::Snowflake;

/// Immutable guild measurement. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Row id once persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub guild_id: Snowflake,
    pub guild_name: String,
    pub timestamp: DateTime<Utc>,
    pub member_count: i64,
    pub channel_count: i64,
    pub text_channels: i64,
    pub voice_channels: i64,
    pub categories: i64,
    pub role_count: i64,
    pub bot_count: i64,
    pub booster_count: i64,
    pub is_auto: bool,
}

impl Snapshot {
    /// Build an unsaved snapshot from the live state of a guild
    pub fn capture(state: &GuildState, at: DateTime<Utc>, is_auto: bool) -> Self {
        let channels = state.channel_counts();
        Self {
            id: None,
            guild_id: state.id,
            guild_name: state.name.clone(),
            timestamp: at,
            member_count: state.member_count.max(0),
            channel_count: channels.total,
            text_channels: channels.text,
            voice_channels: channels.voice,
            categories: channels.categories,
            role_count: state.role_count,
            bot_count: state.bot_count,
            booster_count: state.booster_count,
            is_auto,
        }
    }

    /// Members that are not bots
    #[inline]
    pub fn human_count(&self) -> i64 {
        (self.member_count - self.bot_count).max(0)
    }
}

/// Sort snapshots chronologically; ties keep insertion order
pub(crate) fn sorted_by_time(snapshots: &[Snapshot]) -> Vec<&Snapshot> {
    let mut sorted: Vec<&Snapshot> = snapshots.iter().collect();
    sorted.sort_by_key(|s| s.timestamp);
    sorted
}
