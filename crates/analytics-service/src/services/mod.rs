//! Business logic services
//!
//! Services borrow a [`ServiceContext`] and orchestrate repositories, the guild source
//! and the bot gateway.

pub mod collector;
pub mod config;
pub mod context;
pub mod demographics;
pub mod error;
pub mod insights;
pub mod maintenance;
pub mod query;
pub mod sweep;
pub mod trigger;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export all services for convenience
pub use collector::{AutoSnapshotOutcome, CollectorService};
pub use config::ConfigService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use demographics::{DemographicsService, FetchOutcome};
pub use error::{ServiceError, ServiceResult};
pub use insights::{GrowthReport, InsightService, DEFAULT_LOOKBACK_DAYS, HISTORY_LIMIT};
pub use maintenance::{MaintenanceService, StoreStats};
pub use query::QueryService;
pub use sweep::{SweepFailure, SweepService, SweepSummary};
pub use trigger::{record_notification, TriggerService};
