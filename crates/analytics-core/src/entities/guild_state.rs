//! Live guild state as reported by the chat platform client
//!
//! These types are inputs to the collector; they are never persisted as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Channel kind as far as analytics is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    /// Stage, forum, thread, ... (counted in the total only)
    Other,
}

/// A channel of a live guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: Snowflake,
    pub name: String,
    pub kind: ChannelKind,
    /// Whether the acting client may read message history here
    pub readable: bool,
}

impl ChannelInfo {
    pub fn new(id: Snowflake, name: impl Into<String>, kind: ChannelKind, readable: bool) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            readable,
        }
    }

    /// Usable as member enumeration context
    #[inline]
    pub fn is_readable_text(&self) -> bool {
        self.kind == ChannelKind::Text && self.readable
    }
}

/// Channel totals derived from a channel list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelCounts {
    pub total: i64,
    pub text: i64,
    pub voice: i64,
    pub categories: i64,
}

/// Current state of a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildState {
    pub id: Snowflake,
    pub name: String,
    pub channels: Vec<ChannelInfo>,
    pub member_count: i64,
    pub role_count: i64,
    pub bot_count: i64,
    pub booster_count: i64,
}

impl GuildState {
    pub fn channel_counts(&self) -> ChannelCounts {
        self.channels
            .iter()
            .fold(ChannelCounts::default(), |mut counts, channel| {
                counts.total += 1;
                match channel.kind {
                    ChannelKind::Text => counts.text += 1,
                    ChannelKind::Voice => counts.voice += 1,
                    ChannelKind::Category => counts.categories += 1,
                    ChannelKind::Other => {}
                }
                counts
            })
    }

    pub fn channel(&self, id: Snowflake) -> Option<&ChannelInfo> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Readable text channels in guild order
    pub fn readable_text_channels(&self) -> impl Iterator<Item = &ChannelInfo> {
        self.channels.iter().filter(|c| c.is_readable_text())
    }
}

/// A guild member as enumerated by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub id: Snowflake,
    pub name: String,
    pub account_created: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
}
