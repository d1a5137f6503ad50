//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::{DemographicRecord, GuildConfig, Snapshot};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Time window applied to a count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountWindow {
    All,
    /// `timestamp >= at`
    Since(DateTime<Utc>),
    /// `timestamp < at`
    Before(DateTime<Utc>),
}

/// Member name search parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSearch {
    /// Substring matched against the stored display name
    pub query: String,
    pub guild_id: Option<Snowflake>,
    pub limit: i64,
    pub offset: i64,
}

/// One page of results plus the unpaged total
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage<T> {
    pub results: Vec<T>,
    pub total: i64,
}

/// Row counts per analytics table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub snapshots: i64,
    pub demographics: i64,
    pub server_configs: i64,
    pub tracked_guilds: i64,
}

// ============================================================================
// Snapshot Repository
// ============================================================================

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Append a snapshot, returning its row id
    async fn insert(&self, snapshot: &Snapshot) -> RepoResult<i64>;

    /// All snapshots of a guild, oldest first
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Snapshot>>;

    /// Snapshots taken at or after `since`, oldest first
    async fn find_since(
        &self,
        guild_id: Option<Snowflake>,
        since: DateTime<Utc>,
    ) -> RepoResult<Vec<Snapshot>>;

    /// Snapshot with the greatest timestamp
    async fn latest(&self, guild_id: Snowflake) -> RepoResult<Option<Snapshot>>;

    /// Number of snapshots, optionally for one guild
    async fn count(&self, guild_id: Option<Snowflake>, window: CountWindow) -> RepoResult<i64>;

    /// Number of distinct guilds with at least one snapshot in the window
    async fn count_guilds(&self, window: CountWindow) -> RepoResult<i64>;

    /// Distinct guild ids with snapshots
    async fn guild_ids(&self) -> RepoResult<Vec<Snowflake>>;

    /// Latest known display name of every guild
    async fn latest_names(&self) -> RepoResult<Vec<(Snowflake, String)>>;

    /// Remove every snapshot of one guild
    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64>;

    /// Remove snapshots of one guild older than `cutoff`
    async fn delete_older_than(&self, guild_id: Snowflake, cutoff: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Demographics Repository
// ============================================================================

#[async_trait]
pub trait DemographicsRepository: Send + Sync {
    /// Insert or overwrite the record for (guild_id, member_id)
    async fn upsert(&self, record: &DemographicRecord) -> RepoResult<()>;

    /// Upsert a batch in one transaction
    async fn upsert_many(&self, records: &[DemographicRecord]) -> RepoResult<u64>;

    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<DemographicRecord>>;

    /// Every guild record of one member
    async fn find_by_member(&self, member_id: Snowflake) -> RepoResult<Vec<DemographicRecord>>;

    /// Distinct members, optionally for one guild
    async fn count_members(&self, guild_id: Option<Snowflake>) -> RepoResult<i64>;

    /// Membership rows, windowed on `joined_at`
    async fn count_memberships(
        &self,
        guild_id: Option<Snowflake>,
        window: CountWindow,
    ) -> RepoResult<i64>;

    /// Paged name search ordered by name
    async fn search(&self, search: &MemberSearch) -> RepoResult<SearchPage<DemographicRecord>>;

    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Config Repository
// ============================================================================

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn find(&self, guild_id: Snowflake) -> RepoResult<Option<GuildConfig>>;

    async fn list(&self) -> RepoResult<Vec<GuildConfig>>;

    /// Insert or replace every field of the row
    async fn save(&self, config: &GuildConfig) -> RepoResult<()>;

    /// Capture bookkeeping: create the row with defaults if missing, keep `auto_snapshot`,
    /// set `first_snapshot_date` only when unset and `last_auto_snapshot` only for auto captures
    async fn record_capture(
        &self,
        guild_id: Snowflake,
        at: DateTime<Utc>,
        is_auto: bool,
    ) -> RepoResult<()>;

    /// Atomically move `last_auto_snapshot` from `observed` to `at`.
    ///
    /// Succeeds only while auto snapshots are enabled and nobody else moved the value.
    async fn claim_auto_snapshot(
        &self,
        guild_id: Snowflake,
        observed: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// Create missing rows for guilds with snapshots and fill unset `first_snapshot_date`
    /// from their oldest snapshot
    async fn backfill_from_snapshots(&self) -> RepoResult<u64>;
}

// ============================================================================
// Tracked Guild Repository
// ============================================================================

#[async_trait]
pub trait TrackedGuildRepository: Send + Sync {
    /// Returns true when the guild was not tracked before
    async fn add(&self, guild_id: Snowflake) -> RepoResult<bool>;

    /// Returns true when the guild was tracked
    async fn remove(&self, guild_id: Snowflake) -> RepoResult<bool>;

    async fn contains(&self, guild_id: Snowflake) -> RepoResult<bool>;

    async fn list(&self) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// Maintenance Repository
// ============================================================================

#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    /// Row counts, optionally restricted to one guild
    async fn table_counts(&self, guild_id: Option<Snowflake>) -> RepoResult<TableCounts>;

    /// Delete every row of every table, returning what was removed
    async fn reset(&self) -> RepoResult<TableCounts>;
}
