//! Service context - dependency container for services
//!
//! Holds the repositories, the optional snapshot notifier and collector settings.

use std::sync::Arc;

use analytics_common::CollectorConfig;
use analytics_core::traits::{
    ConfigRepository, DemographicsRepository, MaintenanceRepository, SnapshotNotifier,
    SnapshotRepository, TrackedGuildRepository,
};
use analytics_db::{
    SqliteConfigRepository, SqliteDemographicsRepository, SqliteMaintenanceRepository,
    SqlitePool, SqliteSnapshotRepository, SqliteTrackedGuildRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Passed by reference to every service. Cloning is cheap; all repositories are shared.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    snapshot_repo: Arc<dyn SnapshotRepository>,
    demographics_repo: Arc<dyn DemographicsRepository>,
    config_repo: Arc<dyn ConfigRepository>,
    tracked_repo: Arc<dyn TrackedGuildRepository>,
    maintenance_repo: Arc<dyn MaintenanceRepository>,

    // Notifications after automatic snapshots
    notifier: Option<Arc<dyn SnapshotNotifier>>,

    collector: CollectorConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        snapshot_repo: Arc<dyn SnapshotRepository>,
        demographics_repo: Arc<dyn DemographicsRepository>,
        config_repo: Arc<dyn ConfigRepository>,
        tracked_repo: Arc<dyn TrackedGuildRepository>,
        maintenance_repo: Arc<dyn MaintenanceRepository>,
        notifier: Option<Arc<dyn SnapshotNotifier>>,
        collector: CollectorConfig,
    ) -> Self {
        Self {
            snapshot_repo,
            demographics_repo,
            config_repo,
            tracked_repo,
            maintenance_repo,
            notifier,
            collector,
        }
    }

    /// Context backed by the SQLite repositories sharing one pool
    pub fn sqlite(pool: &SqlitePool, collector: CollectorConfig) -> Self {
        Self::new(
            Arc::new(SqliteSnapshotRepository::new(pool.clone())),
            Arc::new(SqliteDemographicsRepository::new(pool.clone())),
            Arc::new(SqliteConfigRepository::new(pool.clone())),
            Arc::new(SqliteTrackedGuildRepository::new(pool.clone())),
            Arc::new(SqliteMaintenanceRepository::new(pool.clone())),
            None,
            collector,
        )
    }

    /// Attach a notifier for automatic snapshots
    pub fn with_notifier(mut self, notifier: Arc<dyn SnapshotNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    // === Repositories ===

    pub fn snapshot_repo(&self) -> &dyn SnapshotRepository {
        self.snapshot_repo.as_ref()
    }

    pub fn demographics_repo(&self) -> &dyn DemographicsRepository {
        self.demographics_repo.as_ref()
    }

    pub fn config_repo(&self) -> &dyn ConfigRepository {
        self.config_repo.as_ref()
    }

    pub fn tracked_repo(&self) -> &dyn TrackedGuildRepository {
        self.tracked_repo.as_ref()
    }

    pub fn maintenance_repo(&self) -> &dyn MaintenanceRepository {
        self.maintenance_repo.as_ref()
    }

    // === Collaborators ===

    pub fn notifier(&self) -> Option<&dyn SnapshotNotifier> {
        self.notifier.as_deref()
    }

    /// Collector settings (sample rate, sweep pacing)
    pub fn collector(&self) -> &CollectorConfig {
        &self.collector
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("notifier", &self.notifier.is_some())
            .field("collector", &self.collector)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom repositories
pub struct ServiceContextBuilder {
    snapshot_repo: Option<Arc<dyn SnapshotRepository>>,
    demographics_repo: Option<Arc<dyn DemographicsRepository>>,
    config_repo: Option<Arc<dyn ConfigRepository>>,
    tracked_repo: Option<Arc<dyn TrackedGuildRepository>>,
    maintenance_repo: Option<Arc<dyn MaintenanceRepository>>,
    notifier: Option<Arc<dyn SnapshotNotifier>>,
    collector: CollectorConfig,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            snapshot_repo: None,
            demographics_repo: None,
            config_repo: None,
            tracked_repo: None,
            maintenance_repo: None,
            notifier: None,
            collector: CollectorConfig::default(),
        }
    }

    pub fn snapshot_repo(mut self, repo: Arc<dyn SnapshotRepository>) -> Self {
        self.snapshot_repo = Some(repo);
        self
    }

    pub fn demographics_repo(mut self, repo: Arc<dyn DemographicsRepository>) -> Self {
        self.demographics_repo = Some(repo);
        self
    }

    pub fn config_repo(mut self, repo: Arc<dyn ConfigRepository>) -> Self {
        self.config_repo = Some(repo);
        self
    }

    pub fn tracked_repo(mut self, repo: Arc<dyn TrackedGuildRepository>) -> Self {
        self.tracked_repo = Some(repo);
        self
    }

    pub fn maintenance_repo(mut self, repo: Arc<dyn MaintenanceRepository>) -> Self {
        self.maintenance_repo = Some(repo);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn SnapshotNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn collector(mut self, collector: CollectorConfig) -> Self {
        self.collector = collector;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any repository is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.snapshot_repo
                .ok_or_else(|| ServiceError::validation("snapshot_repo is required"))?,
            self.demographics_repo
                .ok_or_else(|| ServiceError::validation("demographics_repo is required"))?,
            self.config_repo
                .ok_or_else(|| ServiceError::validation("config_repo is required"))?,
            self.tracked_repo
                .ok_or_else(|| ServiceError::validation("tracked_repo is required"))?,
            self.maintenance_repo
                .ok_or_else(|| ServiceError::validation("maintenance_repo is required"))?,
            self.notifier,
            self.collector,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
