//! Test fixtures and data generators

use std::collections::HashMap;
use std::sync::Arc;

use analytics_common::{AppConfig, CollectorConfig};
use analytics_core::{
    ChannelInfo, ChannelKind, DomainError, GuildSource, GuildState, MemberInfo, RepoResult,
    Snowflake,
};
use analytics_db::create_memory_pool;
use analytics_service::{CollectorService, ServiceContext};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Shared secret used by every test configuration
pub const TEST_TOKEN: &str = "integration-secret";

/// Configuration without sweep pauses, pointing at the given gateway
pub fn test_config(gateway_url: &str) -> AppConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("ANALYTICS_API_TOKEN", TEST_TOKEN.to_string()),
        ("ANALYTICS_GATEWAY_URL", gateway_url.to_string()),
        ("DATABASE_URL", "sqlite::memory:".to_string()),
        ("TRIGGER_TIMEOUT_SECS", "5".to_string()),
        ("SWEEP_SNAPSHOT_DELAY_SECS", "0".to_string()),
        ("SWEEP_FETCH_DELAY_SECS", "0".to_string()),
        ("AUTO_SNAPSHOT_SAMPLE_RATE", "1".to_string()),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

pub fn fast_collector() -> CollectorConfig {
    CollectorConfig {
        auto_sample_rate: 1.0,
        snapshot_delay_secs: 0,
        fetch_delay_secs: 0,
    }
}

/// Context over a fresh in-memory store
pub async fn memory_context() -> ServiceContext {
    let pool = create_memory_pool().await.expect("in-memory pool");
    ServiceContext::sqlite(&pool, fast_collector())
}

pub fn day(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

/// A guild with a readable `#general`, a hidden `#staff` and a voice channel
pub fn guild(id: u64, name: &str, members: i64) -> GuildState {
    GuildState {
        id: Snowflake::new(id),
        name: name.to_string(),
        channels: vec![
            ChannelInfo::new(general_channel(id), "general", ChannelKind::Text, true),
            ChannelInfo::new(hidden_channel(id), "staff", ChannelKind::Text, false),
            ChannelInfo::new(Snowflake::new(id * 10 + 3), "Lounge", ChannelKind::Voice, true),
        ],
        member_count: members,
        role_count: 5,
        bot_count: 2,
        booster_count: 3,
    }
}

/// A guild where the bot cannot read any text channel
pub fn locked_guild(id: u64, name: &str) -> GuildState {
    GuildState {
        channels: vec![ChannelInfo::new(
            hidden_channel(id),
            "staff",
            ChannelKind::Text,
            false,
        )],
        ..guild(id, name, 10)
    }
}

pub fn general_channel(guild_id: u64) -> Snowflake {
    Snowflake::new(guild_id * 10 + 1)
}

pub fn hidden_channel(guild_id: u64) -> Snowflake {
    Snowflake::new(guild_id * 10 + 2)
}

/// `count` members named `member-N`, joined one day apart
pub fn members(count: u64) -> Vec<MemberInfo> {
    (1..=count)
        .map(|n| MemberInfo {
            id: Snowflake::new(1000 + n),
            name: format!("member-{n}"),
            account_created: Some(day(1, 0) - Duration::days(n as i64 * 30)),
            joined_at: Some(day(1, 0) + Duration::days(n as i64)),
        })
        .collect()
}

/// In-memory stand-in for the bot's view of its guilds
#[derive(Default)]
pub struct StaticGuildSource {
    guilds: Vec<GuildState>,
    members: HashMap<Snowflake, Vec<MemberInfo>>,
}

impl StaticGuildSource {
    pub fn new(guilds: Vec<GuildState>) -> Self {
        Self {
            guilds,
            members: HashMap::new(),
        }
    }

    pub fn with_members(mut self, guild_id: u64, members: Vec<MemberInfo>) -> Self {
        self.members.insert(Snowflake::new(guild_id), members);
        self
    }

    pub fn shared(self) -> Arc<dyn GuildSource> {
        Arc::new(self)
    }
}

#[async_trait]
impl GuildSource for StaticGuildSource {
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
        let guild = self
            .guilds
            .iter()
            .find(|g| g.id == guild_id)
            .ok_or(DomainError::GuildNotFound(guild_id))?;
        if !guild.channel(channel_id).is_some_and(|c| c.is_readable_text()) {
            return Err(DomainError::SourceError("missing access".to_string()));
        }
        Ok(self.members.get(&guild_id).cloned().unwrap_or_default())
    }
}

/// Record snapshots of `guild` with the given member counts, one day apart from March 1st
pub async fn seed_snapshots(ctx: &ServiceContext, base: &GuildState, counts: &[i64]) {
    let collector = CollectorService::new(ctx);
    for (i, &count) in counts.iter().enumerate() {
        let state = GuildState {
            member_count: count,
            ..base.clone()
        };
        collector
            .capture_at(&state, day(1 + i as u32, 12), false)
            .await
            .expect("seed snapshot");
    }
}
