//! Period-over-period comparison

use serde::Serialize;

use super::{closest_to, days_before, fractional_days};
use crate::entities::{sorted_by_time, Snapshot};

/// Deltas between the latest snapshot and the one closest to `days` before it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub requested_days: i64,
    /// Actual distance between the two snapshots
    pub days_between: f64,
    pub current: Snapshot,
    pub previous: Snapshot,
    pub member_change: i64,
    pub member_change_percent: f64,
    pub channel_change: i64,
    pub text_channel_change: i64,
    pub voice_channel_change: i64,
    pub role_change: i64,
    pub bot_change: i64,
}

/// Percentage change guarded against a zero denominator
pub fn percent_change(previous: i64, current: i64) -> f64 {
    if previous == 0 {
        0.0
    } else {
        (current - previous) as f64 / previous as f64 * 100.0
    }
}

/// Compare the latest snapshot with the one closest to `days` earlier.
///
/// Returns `None` when fewer than two snapshots exist.
pub fn compare_periods(snapshots: &[Snapshot], days: i64) -> Option<PeriodComparison> {
    let sorted = sorted_by_time(snapshots);
    let (current, earlier) = sorted.split_last()?;
    let previous = closest_to(earlier, days_before(current.timestamp, days))?;

    Some(PeriodComparison {
        requested_days: days,
        days_between: fractional_days(current.timestamp - previous.timestamp),
        member_change: current.member_count - previous.member_count,
        member_change_percent: percent_change(previous.member_count, current.member_count),
        channel_change: current.channel_count - previous.channel_count,
        text_channel_change: current.text_channels - previous.text_channels,
        voice_channel_change: current.voice_channels - previous.voice_channels,
        role_change: current.role_count - previous.role_count,
        bot_change: current.bot_count - previous.bot_count,
        current: (*current).clone(),
        previous: previous.clone(),
    })
}
