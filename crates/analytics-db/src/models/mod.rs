//! Database models - SQLx-compatible structs for the SQLite tables
//!
//! Ids and timestamps are TEXT columns; nullable legacy integers are coalesced in the
//! SELECT lists so every numeric field decodes as `i64`.

mod config;
mod demographic;
mod snapshot;

pub use config::ServerConfigModel;
pub use demographic::DemographicModel;
pub use snapshot::{SnapshotModel, SNAPSHOT_COLUMNS};
