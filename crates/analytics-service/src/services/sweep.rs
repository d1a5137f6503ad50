//! Batch sweeps over many guilds
//!
//! Sweeps run guilds one after another with fixed pauses in between. A failing guild is
//! recorded in the [`SweepSummary`] and never stops the batch.

use std::collections::HashSet;
use std::time::Duration;

use analytics_core::{GuildSource, Snowflake};
use tracing::{info, instrument, warn};

use crate::clients::BotTrigger;
use crate::dto::SweepResponse;

use super::collector::CollectorService;
use super::context::ServiceContext;
use super::demographics::DemographicsService;
use super::error::ServiceResult;

/// A guild the sweep could not process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub guild_id: Snowflake,
    pub error: String,
}

/// Outcome of a sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Guilds considered
    pub scanned: usize,
    /// Guilds left out because they already have snapshots
    pub already_monitored: usize,
    pub processed: usize,
    pub failures: Vec<SweepFailure>,
    pub members_fetched: i64,
}

impl SweepSummary {
    pub fn targeted(&self) -> usize {
        self.scanned - self.already_monitored
    }

    fn fail(&mut self, guild_id: Snowflake, error: impl ToString) {
        let error = error.to_string();
        warn!(guild_id = %guild_id, %error, "Sweep step failed");
        self.failures.push(SweepFailure { guild_id, error });
    }

    /// Dashboard body: `{success, count}` plus the collected errors
    pub fn to_response(&self) -> SweepResponse {
        let error = (!self.failures.is_empty()).then(|| {
            let errors: Vec<String> = self
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.guild_id, f.error))
                .collect();
            format!("Errors for some servers: [{}]", errors.join(", "))
        });
        SweepResponse {
            success: error.is_none(),
            count: self.processed,
            error,
        }
    }
}

/// Sweep service
pub struct SweepService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SweepService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn pause(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Snapshot and fetch members of every visible guild that has no snapshots yet
    #[instrument(skip(self, source))]
    pub async fn holylogger(&self, source: &dyn GuildSource) -> ServiceResult<SweepSummary> {
        let guilds = source.guilds().await?;
        let monitored: HashSet<Snowflake> =
            self.ctx.snapshot_repo().guild_ids().await?.into_iter().collect();

        let pending: Vec<_> = guilds.iter().filter(|g| !monitored.contains(&g.id)).collect();
        let mut summary = SweepSummary {
            scanned: guilds.len(),
            already_monitored: guilds.len() - pending.len(),
            ..Default::default()
        };
        info!(scanned = summary.scanned, pending = pending.len(), "Holylogger started");

        let collector = CollectorService::new(self.ctx);
        let demographics = DemographicsService::new(self.ctx);
        let delays = self.ctx.collector();

        for (i, state) in pending.iter().enumerate() {
            if let Err(e) = collector.capture(state, false).await {
                summary.fail(state.id, e);
                continue;
            }
            Self::pause(delays.snapshot_delay()).await;

            // a failed member fetch still counts the guild as processed
            match demographics.fetch(source, state.id, None).await {
                Ok(outcome) => summary.members_fetched += outcome.members_fetched,
                Err(e) => warn!(guild_id = %state.id, error = %e, "Holylogger member fetch failed"),
            }
            summary.processed += 1;

            if i + 1 < pending.len() {
                Self::pause(delays.fetch_delay()).await;
            }
        }

        info!(
            processed = summary.processed,
            failed = summary.failures.len(),
            members = summary.members_fetched,
            "Holylogger finished"
        );
        Ok(summary)
    }

    /// Guilds with a stored config, or every guild with snapshots when there are none
    pub async fn targets(&self) -> ServiceResult<Vec<Snowflake>> {
        let configured: Vec<Snowflake> = self
            .ctx
            .config_repo()
            .list()
            .await?
            .into_iter()
            .map(|c| c.guild_id)
            .collect();
        if !configured.is_empty() {
            return Ok(configured);
        }
        Ok(self.ctx.snapshot_repo().guild_ids().await?)
    }

    /// Ask the bot to snapshot every target guild
    #[instrument(skip(self, trigger))]
    pub async fn snapshot_all(&self, trigger: &dyn BotTrigger) -> ServiceResult<SweepSummary> {
        let targets = self.targets().await?;
        let mut summary = SweepSummary {
            scanned: targets.len(),
            ..Default::default()
        };

        for (i, &guild_id) in targets.iter().enumerate() {
            match trigger.take_snapshot(guild_id).await {
                Ok(_) => summary.processed += 1,
                Err(e) => summary.fail(guild_id, e),
            }
            if i + 1 < targets.len() {
                Self::pause(self.ctx.collector().snapshot_delay()).await;
            }
        }

        info!(count = summary.processed, failed = summary.failures.len(), "Snapshot sweep finished");
        Ok(summary)
    }

    /// Ask the bot to fetch members of every target guild
    #[instrument(skip(self, trigger))]
    pub async fn fetch_all(&self, trigger: &dyn BotTrigger) -> ServiceResult<SweepSummary> {
        let targets = self.targets().await?;
        let mut summary = SweepSummary {
            scanned: targets.len(),
            ..Default::default()
        };

        for (i, &guild_id) in targets.iter().enumerate() {
            match trigger.fetch_members(guild_id, None).await {
                Ok(response) => {
                    summary.processed += 1;
                    summary.members_fetched += response.members_fetched;
                }
                Err(e) => summary.fail(guild_id, e),
            }
            if i + 1 < targets.len() {
                Self::pause(self.ctx.collector().fetch_delay()).await;
            }
        }

        info!(count = summary.processed, failed = summary.failures.len(), "Fetch sweep finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{at, guild, member, memory_context, FakeSource, FakeTrigger};

    #[tokio::test]
    async fn test_holylogger_skips_monitored_guilds() {
        let ctx = memory_context().await;
        CollectorService::new(&ctx)
            .capture_at(&guild(1, "Known", 5), at(1, 0), false)
            .await
            .unwrap();

        let mut source = FakeSource::new(vec![
            guild(1, "Known", 5),
            guild(2, "New", 7),
            guild(3, "Broken", 9),
        ])
        .with_members(2, vec![member(20, "a", at(1, 0), at(1, 0)), member(21, "b", at(1, 0), at(1, 0))]);
        source.broken.push(Snowflake::new(3));

        let summary = SweepService::new(&ctx).holylogger(&source).await.unwrap();
        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.already_monitored, 1);
        assert_eq!(summary.targeted(), 2);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.members_fetched, 2);
        assert!(summary.failures.is_empty());
        assert_eq!(ctx.snapshot_repo().guild_ids().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_snapshot_all_collects_failures() {
        let ctx = memory_context().await;
        let collector = CollectorService::new(&ctx);
        for id in [1, 2, 3] {
            collector.capture_at(&guild(id, "G", 5), at(1, 0), false).await.unwrap();
        }
        let trigger = FakeTrigger {
            failing: vec![Snowflake::new(2)],
            ..Default::default()
        };

        let summary = SweepService::new(&ctx).snapshot_all(&trigger).await.unwrap();
        assert_eq!(trigger.calls.lock().unwrap().len(), 3);
        assert_eq!(summary.processed, 2);

        let response = summary.to_response();
        assert!(!response.success);
        assert_eq!(response.count, 2);
        assert_eq!(
            response.error.as_deref(),
            Some("Errors for some servers: [2: Guild not found or not accessible]")
        );
    }

    #[tokio::test]
    async fn test_fetch_all_without_targets() {
        let ctx = memory_context().await;
        let summary = SweepService::new(&ctx)
            .fetch_all(&FakeTrigger::default())
            .await
            .unwrap();
        let response = summary.to_response();
        assert!(response.success);
        assert_eq!(response.count, 0);
    }
}
