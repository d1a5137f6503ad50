//! Ports towards the chat platform and the dashboard

use async_trait::async_trait;

use crate::entities::{GuildState, MemberInfo, Snapshot};
use crate::value_objects::Snowflake;

use super::repositories::RepoResult;

/// Read access to live guilds, implemented by the embedding bot client
#[async_trait]
pub trait GuildSource: Send + Sync {
    /// Current state of a guild the client can see
    async fn guild(&self, guild_id: Snowflake) -> RepoResult<Option<GuildState>>;

    /// Every guild the client can see
    async fn guilds(&self) -> RepoResult<Vec<GuildState>>;

    /// Enumerate members using `channel_id` as context. Slow and rate-limited.
    async fn fetch_members(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> RepoResult<Vec<MemberInfo>>;
}

/// Receives a notice after every automatic snapshot
#[async_trait]
pub trait SnapshotNotifier: Send + Sync {
    async fn snapshot_taken(&self, snapshot: &Snapshot) -> RepoResult<()>;
}
