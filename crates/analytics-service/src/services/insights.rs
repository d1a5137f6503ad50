//! Growth analysis over a guild's snapshot log

use analytics_core::analysis::{member_history, MemberCountRun};
use analytics_core::{
    compare_periods, project, GrowthHorizons, Milestone, Snapshot, Snowflake, TrendResult,
};
use tracing::instrument;

use crate::dto::{CompareResponse, TrendResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Default lookback of the trend and comparison views
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Snapshots shown by the member history
pub const HISTORY_LIMIT: usize = 7;

/// Everything the report command needs
#[derive(Debug, Clone)]
pub struct GrowthReport {
    pub first: Snapshot,
    pub latest: Snapshot,
    /// First snapshot holding the maximum member count
    pub peak: Snapshot,
    pub snapshot_count: usize,
    pub trend: TrendResult,
    pub milestone: Milestone,
}

/// Insight service
pub struct InsightService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InsightService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn snapshots(&self, guild_id: Snowflake) -> ServiceResult<Vec<Snapshot>> {
        Ok(self.ctx.snapshot_repo().find_by_guild(guild_id).await?)
    }

    /// Projection plus the next milestone
    #[instrument(skip(self))]
    pub async fn trend(&self, guild_id: Snowflake, days: i64) -> ServiceResult<TrendResponse> {
        let snaps = self.snapshots(guild_id).await?;
        let trend = project(&snaps, days);
        let current_members = snaps.iter().max_by_key(|s| s.timestamp).map(|s| s.member_count);
        let milestone = current_members
            .filter(|_| !trend.is_insufficient())
            .map(|members| Milestone::estimate(members, trend.growth_rate_daily));

        Ok(TrendResponse {
            guild_id,
            current_members,
            trend,
            milestone,
        })
    }

    /// Short, medium and long projections with the latest snapshot; `None` below two snapshots
    #[instrument(skip(self))]
    pub async fn horizons(
        &self,
        guild_id: Snowflake,
    ) -> ServiceResult<Option<(Snapshot, GrowthHorizons)>> {
        let snaps = self.snapshots(guild_id).await?;
        if snaps.len() < 2 {
            return Ok(None);
        }
        let latest = snaps.iter().max_by_key(|s| s.timestamp).cloned();
        Ok(latest.map(|latest| (latest, GrowthHorizons::analyze(&snaps))))
    }

    #[instrument(skip(self))]
    pub async fn compare(&self, guild_id: Snowflake, days: i64) -> ServiceResult<CompareResponse> {
        let snaps = self.snapshots(guild_id).await?;
        let comparison = compare_periods(&snaps, days);
        Ok(CompareResponse {
            guild_id,
            days,
            insufficient_data: comparison.is_none(),
            comparison,
        })
    }

    /// Recent member counts grouped into runs, newest first
    #[instrument(skip(self))]
    pub async fn history(&self, guild_id: Snowflake) -> ServiceResult<Vec<MemberCountRun>> {
        let snaps = self.snapshots(guild_id).await?;
        Ok(member_history(&snaps, HISTORY_LIMIT))
    }

    /// Report data, or the snapshot count when there are fewer than two
    #[instrument(skip(self))]
    pub async fn report(&self, guild_id: Snowflake) -> ServiceResult<Result<GrowthReport, usize>> {
        let mut snaps = self.snapshots(guild_id).await?;
        if snaps.len() < 2 {
            return Ok(Err(snaps.len()));
        }
        snaps.sort_by_key(|s| s.timestamp);

        let trend = project(&snaps, DEFAULT_LOOKBACK_DAYS);
        let snapshot_count = snaps.len();
        let (Some(first), Some(latest)) = (snaps.first().cloned(), snaps.last().cloned()) else {
            return Ok(Err(snapshot_count));
        };
        let peak = snaps
            .iter()
            .fold(&first, |best, s| if s.member_count > best.member_count { s } else { best })
            .clone();
        let milestone = Milestone::estimate(latest.member_count, trend.growth_rate_daily);

        Ok(Ok(GrowthReport {
            first,
            latest,
            peak,
            snapshot_count,
            trend,
            milestone,
        }))
    }
}
