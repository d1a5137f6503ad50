//! Recent member count history, grouped into runs of equal counts

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::{sorted_by_time, Snapshot};

/// Consecutive snapshots that reported the same member count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberCountRun {
    pub member_count: i64,
    pub newest: DateTime<Utc>,
    pub oldest: DateTime<Utc>,
    pub snapshots: usize,
    pub any_auto: bool,
    /// Difference to the next older run, if any
    pub change: Option<i64>,
}

/// Group the `limit` most recent snapshots into runs, newest first
pub fn member_history(snapshots: &[Snapshot], limit: usize) -> Vec<MemberCountRun> {
    let sorted = sorted_by_time(snapshots);
    let mut runs: Vec<MemberCountRun> = Vec::new();

    for snap in sorted.iter().rev().take(limit) {
        match runs.last_mut() {
            Some(run) if run.member_count == snap.member_count => {
                run.oldest = snap.timestamp;
                run.snapshots += 1;
                run.any_auto |= snap.is_auto;
            }
            _ => runs.push(MemberCountRun {
                member_count: snap.member_count,
                newest: snap.timestamp,
                oldest: snap.timestamp,
                snapshots: 1,
                any_auto: snap.is_auto,
                change: None,
            }),
        }
    }

    let older_counts: Vec<i64> = runs.iter().skip(1).map(|r| r.member_count).collect();
    for (run, older) in runs.iter_mut().zip(older_counts) {
        run.change = Some(run.member_count - older);
    }
    runs
}
