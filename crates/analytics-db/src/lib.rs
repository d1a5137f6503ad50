//! # analytics-db
//!
//! Database layer implementing the analytics repository traits with SQLite via SQLx.
//!
//! ## Overview
//!
//! This crate provides SQLite implementations for all repository traits
//! defined in `analytics-core`. It handles:
//!
//! - Connection pool management and schema bootstrap
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers (TEXT ids and timestamps)
//! - Repository implementations
//! - One-shot import of the legacy per-guild JSON files
//!
//! ## Usage
//!
//! ```rust,ignore
//! use analytics_db::pool::{create_pool, DatabaseConfig};
//! use analytics_db::repositories::SqliteSnapshotRepository;
//! use analytics_core::traits::SnapshotRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     let snapshots = SqliteSnapshotRepository::new(pool);
//!     let guilds = snapshots.guild_ids().await?;
//!     Ok(())
//! }
//! ```

pub mod import;
pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use import::{GuildImportStats, ImportError, ImportReport, LegacyImporter};
pub use pool::{create_memory_pool, create_pool, ensure_schema, DatabaseConfig, SqlitePool};
pub use repositories::{
    SqliteConfigRepository, SqliteDemographicsRepository, SqliteMaintenanceRepository,
    SqliteSnapshotRepository, SqliteTrackedGuildRepository,
};
