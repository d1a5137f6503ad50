//! Traits (ports) implemented by the infrastructure layers

mod guild_source;
mod repositories;

pub use guild_source::{GuildSource, SnapshotNotifier};
pub use repositories::{
    ConfigRepository, CountWindow, DemographicsRepository, MaintenanceRepository, MemberSearch,
    RepoResult, SearchPage, SnapshotRepository, TableCounts, TrackedGuildRepository,
};
