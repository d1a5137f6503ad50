//! # analytics-core
//!
//! Domain layer for guild analytics: snapshot and demographic entities, value objects,
//! repository and guild-source traits, and the pure analysis functions (trend projection,
//! bucketing, period comparison, demographic rankings).
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod analysis;
pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use analysis::{
    compare_periods, project, rank_demographics, Confidence, GrowthHorizons, Milestone,
    PeriodComparison, TrendKind, TrendResult,
};
pub use entities::{
    ChannelCounts, ChannelInfo, ChannelKind, ConfigField, DemographicRecord, GuildConfig,
    GuildState, MemberInfo, Snapshot,
};
pub use error::DomainError;
pub use traits::{
    ConfigRepository, CountWindow, DemographicsRepository, GuildSource, MaintenanceRepository, MemberSearch,
    RepoResult, SearchPage, SnapshotNotifier, SnapshotRepository, TableCounts,
    TrackedGuildRepository,
};
pub use value_objects::{format_timestamp, parse_timestamp, Snowflake, SnowflakeParseError};
