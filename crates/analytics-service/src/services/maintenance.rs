//! Store maintenance: statistics, retention pruning and wipes

use analytics_core::{Snowflake, TableCounts};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use super::config::ConfigService;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Row counts for one guild and for the whole store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub guild: TableCounts,
    pub global: TableCounts,
}

/// Maintenance service
pub struct MaintenanceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MaintenanceService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self, guild_id: Snowflake) -> ServiceResult<StoreStats> {
        let repo = self.ctx.maintenance_repo();
        Ok(StoreStats {
            guild: repo.table_counts(Some(guild_id)).await?,
            global: repo.table_counts(None).await?,
        })
    }

    pub async fn prune(&self, guild_id: Snowflake) -> ServiceResult<u64> {
        self.prune_at(guild_id, Utc::now()).await
    }

    /// Delete snapshots older than the guild's retention period
    #[instrument(skip(self))]
    pub async fn prune_at(&self, guild_id: Snowflake, now: DateTime<Utc>) -> ServiceResult<u64> {
        let config = ConfigService::new(self.ctx).get(guild_id).await?;
        let cutoff = config.retention_cutoff(now);
        let removed = self
            .ctx
            .snapshot_repo()
            .delete_older_than(guild_id, cutoff)
            .await?;

        info!(guild_id = %guild_id, removed, %cutoff, "Pruned snapshots");
        Ok(removed)
    }

    /// Delete the guild's snapshot log; demographics and config stay
    #[instrument(skip(self))]
    pub async fn clear(&self, guild_id: Snowflake) -> ServiceResult<u64> {
        let removed = self.ctx.snapshot_repo().delete_by_guild(guild_id).await?;
        info!(guild_id = %guild_id, removed, "Snapshots cleared");
        Ok(removed)
    }

    /// Wipe every table
    #[instrument(skip(self))]
    pub async fn reset(&self) -> ServiceResult<TableCounts> {
        Ok(self.ctx.maintenance_repo().reset().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::collector::CollectorService;
    use crate::services::test_support::{at, guild, memory_context};
    use analytics_core::ConfigField;

    #[tokio::test]
    async fn test_prune_uses_retention() {
        let ctx = memory_context().await;
        let collector = CollectorService::new(&ctx);
        for day in [1, 5, 9] {
            collector.capture_at(&guild(1, "A", 10), at(day, 0), false).await.unwrap();
        }
        ConfigService::new(&ctx)
            .set(Snowflake::new(1), ConfigField::RetentionDays(5))
            .await
            .unwrap();

        let removed = MaintenanceService::new(&ctx)
            .prune_at(Snowflake::new(1), at(10, 0))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(ctx.snapshot_repo().find_by_guild(Snowflake::new(1)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_is_per_guild() {
        let ctx = memory_context().await;
        let collector = CollectorService::new(&ctx);
        collector.capture_at(&guild(1, "A", 10), at(1, 0), false).await.unwrap();
        collector.capture_at(&guild(2, "B", 10), at(1, 0), false).await.unwrap();

        let service = MaintenanceService::new(&ctx);
        assert_eq!(service.clear(Snowflake::new(1)).await.unwrap(), 1);

        let stats = service.stats(Snowflake::new(2)).await.unwrap();
        assert_eq!(stats.guild.snapshots, 1);
        assert_eq!(stats.global.snapshots, 1);

        let removed = service.reset().await.unwrap();
        assert_eq!(removed.snapshots, 1);
        assert_eq!(removed.server_configs, 2);
        assert_eq!(service.stats(Snowflake::new(2)).await.unwrap().global, TableCounts::default());
    }
}
