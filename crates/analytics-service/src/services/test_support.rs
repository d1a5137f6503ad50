//! Fixtures shared by the service tests

use std::collections::HashMap;
use std::sync::Mutex;

use analytics_common::CollectorConfig;
use analytics_core::{
    ChannelInfo, ChannelKind, DomainError, GuildSource, GuildState, MemberInfo, RepoResult,
    Snapshot, SnapshotNotifier, Snowflake,
};
use analytics_db::create_memory_pool;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use super::context::ServiceContext;
use crate::clients::{BotTrigger, TriggerError};
use crate::dto::{GatewayFetchResponse, GatewaySnapshotResponse};

/// Collector settings without sweep pauses
pub fn fast_collector() -> CollectorConfig {
    CollectorConfig {
        auto_sample_rate: 1.0,
        snapshot_delay_secs: 0,
        fetch_delay_secs: 0,
    }
}

/// Context over a fresh in-memory database
pub async fn memory_context() -> ServiceContext {
    let pool = create_memory_pool().await.unwrap();
    ServiceContext::sqlite(&pool, fast_collector())
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

/// A guild with one readable and one hidden text channel plus a voice channel
pub fn guild(id: u64, name: &str, members: i64) -> GuildState {
    GuildState {
        id: Snowflake::new(id),
        name: name.to_string(),
        channels: vec![
            ChannelInfo::new(Snowflake::new(id * 10 + 1), "general", ChannelKind::Text, true),
            ChannelInfo::new(Snowflake::new(id * 10 + 2), "staff", ChannelKind::Text, false),
            ChannelInfo::new(Snowflake::new(id * 10 + 3), "Lounge", ChannelKind::Voice, true),
        ],
        member_count: members,
        role_count: 4,
        bot_count: 1,
        booster_count: 2,
    }
}

pub fn member(id: u64, name: &str, created: DateTime<Utc>, joined: DateTime<Utc>) -> MemberInfo {
    MemberInfo {
        id: Snowflake::new(id),
        name: name.to_string(),
        account_created: Some(created),
        joined_at: Some(joined),
    }
}

/// In-memory guild source
#[derive(Default)]
pub struct FakeSource {
    pub guilds: Vec<GuildState>,
    pub members: HashMap<Snowflake, Vec<MemberInfo>>,
    /// Guilds whose member fetch fails
    pub broken: Vec<Snowflake>,
    pub fetched_with: Mutex<Vec<(Snowflake, Snowflake)>>,
}

impl FakeSource {
    pub fn new(guilds: Vec<GuildState>) -> Self {
        Self {
            guilds,
            ..Default::default()
        }
    }

    pub fn with_members(mut self, guild_id: u64, members: Vec<MemberInfo>) -> Self {
        self.members.insert(Snowflake::new(guild_id), members);
        self
    }
}

#[async_trait]
impl GuildSource for FakeSource {
    async fn guild(&self, guild_id: Snowflake) -> RepoResult<Option<GuildState>> {
        Ok(self.guilds.iter().find(|g| g.id == guild_id).cloned())
    }

    async fn guilds(&self) -> RepoResult<Vec<GuildState>> {
        Ok(self.guilds.clone())
    }

    async fn fetch_members(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> RepoResult<Vec<MemberInfo>> {
        self.fetched_with.lock().unwrap().push((guild_id, channel_id));
        if self.broken.contains(&guild_id) {
            return Err(DomainError::SourceError("rate limited".to_string()));
        }
        Ok(self.members.get(&guild_id).cloned().unwrap_or_default())
    }
}

/// Records every notice it receives
#[derive(Default)]
pub struct RecordingNotifier {
    pub seen: Mutex<Vec<Snapshot>>,
}

#[async_trait]
impl SnapshotNotifier for RecordingNotifier {
    async fn snapshot_taken(&self, snapshot: &Snapshot) -> RepoResult<()> {
        self.seen.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

/// Gateway stand-in; guilds listed in `failing` are rejected with a 404
#[derive(Default)]
pub struct FakeTrigger {
    pub failing: Vec<Snowflake>,
    pub calls: Mutex<Vec<Snowflake>>,
}

impl FakeTrigger {
    fn check(&self, guild_id: Snowflake) -> Result<(), TriggerError> {
        self.calls.lock().unwrap().push(guild_id);
        if self.failing.contains(&guild_id) {
            return Err(TriggerError::Rejected {
                status: 404,
                message: "Guild not found or not accessible".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BotTrigger for FakeTrigger {
    async fn take_snapshot(
        &self,
        guild_id: Snowflake,
    ) -> Result<GatewaySnapshotResponse, TriggerError> {
        self.check(guild_id)?;
        Ok(GatewaySnapshotResponse {
            success: true,
            guild_name: format!("Guild {guild_id}"),
            member_count: 42,
            timestamp: "2024-03-01T00:00:00.000000+00:00".to_string(),
        })
    }

    async fn fetch_members(
        &self,
        guild_id: Snowflake,
        channel_id: Option<Snowflake>,
    ) -> Result<GatewayFetchResponse, TriggerError> {
        self.check(guild_id)?;
        Ok(GatewayFetchResponse {
            success: true,
            guild_name: format!("Guild {guild_id}"),
            members_fetched: 3,
            message: format!("Successfully fetched 3 members from Guild {guild_id}"),
            channel_id: channel_id.map(|id| id.to_string()),
        })
    }
}
