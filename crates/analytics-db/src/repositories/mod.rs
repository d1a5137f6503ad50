//! Repository implementations
//!
//! SQLite implementations of the repository traits defined in analytics-core.
//! All repositories share one `SqlitePool`.

mod config;
mod demographics;
mod error;
mod maintenance;
mod snapshot;
mod tracked;

pub(crate) use config::save_config;
pub(crate) use demographics::upsert_record;
pub(crate) use snapshot::insert_snapshot;
pub(crate) use tracked::track_guild;

pub use config::SqliteConfigRepository;
pub use demographics::SqliteDemographicsRepository;
pub use maintenance::SqliteMaintenanceRepository;
pub use snapshot::SqliteSnapshotRepository;
pub use tracked::SqliteTrackedGuildRepository;

#[cfg(test)]
pub(crate) mod test_support;
