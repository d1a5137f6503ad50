//! Pure analysis over snapshot and demographic data
//!
//! Everything here is deterministic and storage-free; callers load the rows first.

mod buckets;
mod compare;
mod history;
mod rankings;
mod trend;

pub use buckets::{
    bucket_snapshots, daily_series, hourly_counts, ranged_series, Bucket, Granularity, TimeSeries,
};
pub use compare::{compare_periods, percent_change, PeriodComparison};
pub use history::{member_history, MemberCountRun};
pub use rankings::{rank_demographics, DemographicRankings, RankedMember, RANKING_SIZE};
pub use trend::{project, Confidence, GrowthHorizons, Milestone, TrendKind, TrendResult};

use chrono::{DateTime, Duration, Utc};

use crate::entities::Snapshot;

/// Among `candidates`, the snapshot whose timestamp is closest to `target`.
/// Ties resolve to the earlier candidate.
pub(crate) fn closest_to<'a>(
    candidates: &[&'a Snapshot],
    target: DateTime<Utc>,
) -> Option<&'a Snapshot> {
    candidates
        .iter()
        .copied()
        .min_by_key(|s| (s.timestamp - target).abs())
}

/// `days` before `at`, clamped to the representable range
pub(crate) fn days_before(at: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let clamp = if days < 0 {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    };
    Duration::try_days(days)
        .and_then(|lookback| at.checked_sub_signed(lookback))
        .unwrap_or(clamp)
}

/// Elapsed time as fractional days
pub(crate) fn fractional_days(elapsed: Duration) -> f64 {
    elapsed.num_milliseconds() as f64 / 86_400_000.0
}
