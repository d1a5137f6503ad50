//! Dashboard queries
//!
//! Read-side aggregation over the snapshot log and the demographics table.

use std::collections::HashMap;

use analytics_core::analysis::{
    bucket_snapshots, daily_series, hourly_counts, ranged_series, Granularity, TimeSeries,
};
use analytics_core::{rank_demographics, CountWindow, MemberSearch, Snapshot, Snowflake};
use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use tracing::instrument;

use crate::dto::responses::minute_label;
use crate::dto::{
    CountResponse, DemographicsResponse, MemberSearchResult, SearchResponse,
    ServerConfigResponse, ServerStatsResponse, ServerSummary, SnapshotPoint, Stats24hResponse,
    WindowStats,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Query service
pub struct QueryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> QueryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Counters
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn total_snapshots(&self, guild_id: Option<Snowflake>) -> ServiceResult<CountResponse> {
        let count = self.ctx.snapshot_repo().count(guild_id, CountWindow::All).await?;
        Ok(CountResponse { count })
    }

    /// Distinct members with a demographics record
    #[instrument(skip(self))]
    pub async fn user_count(&self, guild_id: Option<Snowflake>) -> ServiceResult<CountResponse> {
        let count = self.ctx.demographics_repo().count_members(guild_id).await?;
        Ok(CountResponse { count })
    }

    /// Demographics rows, one per (guild, member)
    #[instrument(skip(self))]
    pub async fn membership_count(
        &self,
        guild_id: Option<Snowflake>,
    ) -> ServiceResult<CountResponse> {
        let count = self
            .ctx
            .demographics_repo()
            .count_memberships(guild_id, CountWindow::All)
            .await?;
        Ok(CountResponse { count })
    }

    pub async fn stats_24h(&self) -> ServiceResult<Stats24hResponse> {
        self.stats_24h_at(Utc::now()).await
    }

    /// Rolling 24 hour counters; `delta = total - count(before cutoff)`
    #[instrument(skip(self))]
    pub async fn stats_24h_at(&self, now: DateTime<Utc>) -> ServiceResult<Stats24hResponse> {
        let cutoff = now - Duration::hours(24);
        let snapshots = self.ctx.snapshot_repo();
        let demographics = self.ctx.demographics_repo();

        let window = |total: i64, before: i64, last_24h: i64| WindowStats {
            total,
            delta: total - before,
            last_24h,
        };

        Ok(Stats24hResponse {
            snapshots: window(
                snapshots.count(None, CountWindow::All).await?,
                snapshots.count(None, CountWindow::Before(cutoff)).await?,
                snapshots.count(None, CountWindow::Since(cutoff)).await?,
            ),
            servers: window(
                snapshots.count_guilds(CountWindow::All).await?,
                snapshots.count_guilds(CountWindow::Before(cutoff)).await?,
                snapshots.count_guilds(CountWindow::Since(cutoff)).await?,
            ),
            members: window(
                demographics.count_memberships(None, CountWindow::All).await?,
                demographics.count_memberships(None, CountWindow::Before(cutoff)).await?,
                demographics.count_memberships(None, CountWindow::Since(cutoff)).await?,
            ),
        })
    }

    // ========================================================================
    // Time Series
    // ========================================================================

    pub async fn snapshots_24h(&self, guild_id: Option<Snowflake>) -> ServiceResult<TimeSeries> {
        self.snapshots_24h_at(guild_id, Utc::now()).await
    }

    /// Snapshot counts per hour over the last 24 hours, `HH:00` labels
    #[instrument(skip(self))]
    pub async fn snapshots_24h_at(
        &self,
        guild_id: Option<Snowflake>,
        now: DateTime<Utc>,
    ) -> ServiceResult<TimeSeries> {
        let snaps = self
            .ctx
            .snapshot_repo()
            .find_since(guild_id, now - Duration::hours(24))
            .await?;
        Ok(hourly_counts(snaps.iter().map(|s| s.timestamp), now))
    }

    pub async fn members_over_time(
        &self,
        guild_id: Option<Snowflake>,
        days: Option<i64>,
    ) -> ServiceResult<TimeSeries> {
        self.members_over_time_at(guild_id, days, Utc::now()).await
    }

    /// Daily member counts.
    ///
    /// With `days`, one point per day ending today with carry-forward. Without it, a single
    /// guild yields its non-empty days while the cross-guild total spans every day from the
    /// first to the last snapshot.
    #[instrument(skip(self))]
    pub async fn members_over_time_at(
        &self,
        guild_id: Option<Snowflake>,
        days: Option<i64>,
        now: DateTime<Utc>,
    ) -> ServiceResult<TimeSeries> {
        let today = now.date_naive();
        let range_start = days.map(|d| today - Duration::days(d.max(1) - 1));

        if let Some(guild_id) = guild_id {
            let snaps = self.ctx.snapshot_repo().find_by_guild(guild_id).await?;
            return Ok(match range_start {
                Some(start) => daily_series(&snaps, start, today).into_iter().collect(),
                None => bucket_snapshots(&snaps, Granularity::Day).into_iter().collect(),
            });
        }

        let mut per_guild = Vec::new();
        for id in self.ctx.snapshot_repo().guild_ids().await? {
            per_guild.push(self.ctx.snapshot_repo().find_by_guild(id).await?);
        }

        let range = match range_start {
            Some(start) => Some((start, today)),
            None => day_span(per_guild.iter().flatten()),
        };
        let Some((start, end)) = range else {
            return Ok(TimeSeries::default());
        };

        let series: Vec<TimeSeries> = per_guild
            .iter()
            .map(|snaps| daily_series(snaps, start, end).into_iter().collect())
            .collect();
        Ok(TimeSeries::sum(&series))
    }

    // ========================================================================
    // Servers
    // ========================================================================

    /// Every guild with snapshots and its latest display name
    #[instrument(skip(self))]
    pub async fn servers(&self) -> ServiceResult<Vec<ServerSummary>> {
        let names = self.ctx.snapshot_repo().latest_names().await?;
        Ok(names
            .into_iter()
            .map(|(id, name)| ServerSummary {
                name: if name.is_empty() { id.to_string() } else { name },
                id,
            })
            .collect())
    }

    pub async fn server_snapshots(
        &self,
        guild_id: Snowflake,
        group: Option<&str>,
        days: Option<i64>,
    ) -> ServiceResult<Vec<SnapshotPoint>> {
        self.server_snapshots_at(guild_id, group, days, Utc::now()).await
    }

    /// Snapshot log of one guild, optionally grouped by day or week.
    ///
    /// With `days`, every bucket of the last `days` days through today is present and
    /// empty buckets repeat the previous value.
    #[instrument(skip(self))]
    pub async fn server_snapshots_at(
        &self,
        guild_id: Snowflake,
        group: Option<&str>,
        days: Option<i64>,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<SnapshotPoint>> {
        let snaps = self.ctx.snapshot_repo().find_by_guild(guild_id).await?;
        let granularity = group.map(Granularity::parse).unwrap_or_default();
        let today = now.date_naive();
        let buckets = match days {
            Some(days) => {
                let start = today
                    .checked_sub_days(Days::new(days.max(1).unsigned_abs() - 1))
                    .unwrap_or(NaiveDate::MIN);
                ranged_series(&snaps, granularity, start, today)
            }
            None => bucket_snapshots(&snaps, granularity),
        };
        Ok(buckets
            .into_iter()
            .map(|b| SnapshotPoint {
                timestamp: b.label,
                member_count: b.value,
            })
            .collect())
    }

    pub async fn server_stats(
        &self,
        guild_id: Snowflake,
    ) -> ServiceResult<Option<ServerStatsResponse>> {
        self.server_stats_at(guild_id, Utc::now()).await
    }

    /// Headline numbers of one guild; `None` without snapshots
    #[instrument(skip(self))]
    pub async fn server_stats_at(
        &self,
        guild_id: Snowflake,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<ServerStatsResponse>> {
        let snaps = self.ctx.snapshot_repo().find_by_guild(guild_id).await?;
        Ok(summarize(&snaps, now))
    }

    /// Ranked oldest/newest accounts and joins
    #[instrument(skip(self))]
    pub async fn demographics(&self, guild_id: Snowflake) -> ServiceResult<DemographicsResponse> {
        let records = self.ctx.demographics_repo().find_by_guild(guild_id).await?;
        Ok(DemographicsResponse::from(&rank_demographics(&records)))
    }

    /// Substring search over member names
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        guild_id: Option<Snowflake>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<SearchResponse> {
        let page = self
            .ctx
            .demographics_repo()
            .search(&MemberSearch {
                query: query.trim().to_string(),
                guild_id,
                limit,
                offset,
            })
            .await?;

        Ok(SearchResponse {
            has_more: offset.saturating_add(limit) < page.total,
            results: page.results.into_iter().map(MemberSearchResult::from).collect(),
            total: page.total,
            offset,
            limit,
        })
    }

    /// Every guild record of one member, earliest join first
    #[instrument(skip(self))]
    pub async fn user_history(
        &self,
        member_id: Snowflake,
    ) -> ServiceResult<Vec<MemberSearchResult>> {
        let records = self.ctx.demographics_repo().find_by_member(member_id).await?;
        Ok(records.into_iter().map(MemberSearchResult::from).collect())
    }

    /// Configuration of every guild that has snapshots, backfilling missing rows first
    #[instrument(skip(self))]
    pub async fn server_configs(&self) -> ServiceResult<Vec<ServerConfigResponse>> {
        self.ctx.config_repo().backfill_from_snapshots().await?;

        let names: HashMap<Snowflake, String> = self
            .ctx
            .snapshot_repo()
            .latest_names()
            .await?
            .into_iter()
            .filter(|(_, name)| !name.is_empty())
            .collect();

        let mut configs = self.ctx.config_repo().list().await?;
        configs.retain(|c| c.first_snapshot_date.is_some());
        configs.sort_by_key(|c| c.guild_id);

        let mut out = Vec::with_capacity(configs.len());
        for config in configs {
            let last_snapshot = self
                .ctx
                .snapshot_repo()
                .latest(config.guild_id)
                .await?
                .map(|s| s.timestamp);
            let name = names.get(&config.guild_id).cloned();
            out.push(ServerConfigResponse::new(config, name, last_snapshot));
        }
        Ok(out)
    }
}

/// First and last UTC day touched by any snapshot
fn day_span<'s>(snaps: impl Iterator<Item = &'s Snapshot>) -> Option<(NaiveDate, NaiveDate)> {
    snaps
        .map(|s| s.timestamp.date_naive())
        .fold(None, |span, day| match span {
            None => Some((day, day)),
            Some((lo, hi)) => Some((lo.min(day), hi.max(day))),
        })
}

fn summarize(snaps: &[Snapshot], now: DateTime<Utc>) -> Option<ServerStatsResponse> {
    let mut sorted: Vec<&Snapshot> = snaps.iter().collect();
    sorted.sort_by_key(|s| s.timestamp);

    let first = *sorted.first()?;
    let last = *sorted.last()?;

    // first occurrence of the maximum
    let peak = sorted
        .iter()
        .copied()
        .fold(first, |best, s| if s.member_count > best.member_count { s } else { best });

    Some(ServerStatsResponse {
        peak_member_count: peak.member_count,
        peak_member_date: minute_label(peak.timestamp),
        current_member_count: last.member_count,
        current_boosters: last.booster_count,
        change_since_first: format!("{:+}", last.member_count - first.member_count),
        last_snapshot: minute_label(last.timestamp),
        time_since_last: time_since(now - last.timestamp),
        total_snapshots: sorted.len(),
    })
}

fn time_since(elapsed: Duration) -> String {
    let minutes = elapsed.num_minutes().max(0);
    let plural = |n: i64| if n == 1 { "" } else { "s" };
    if minutes < 60 {
        format!("{minutes} minute{} ago", plural(minutes))
    } else {
        let hours = minutes / 60;
        format!("{hours} hour{} ago", plural(hours))
    }
}
