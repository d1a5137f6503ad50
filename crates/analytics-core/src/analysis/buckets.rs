//! Time bucketing of snapshot series
//!
//! A bucket's value is the member count of the chronologically last snapshot inside it,
//! never an average. Ranged series carry the previous value into empty buckets.

use chrono::{DateTime, Datelike, Days, Duration, DurationRound, NaiveDate, Utc};
use serde::Serialize;

use crate::entities::{sorted_by_time, Snapshot};
use crate::value_objects::format_timestamp;

/// Bucket size for a snapshot series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One point per snapshot
    #[default]
    Snapshot,
    /// UTC calendar day
    Day,
    /// ISO week, labelled `YYYY-Www`
    Week,
}

impl Granularity {
    /// Unknown names fall back to per-snapshot points
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "day" | "daily" => Self::Day,
            "week" | "weekly" => Self::Week,
            _ => Self::Snapshot,
        }
    }

    pub fn label(&self, at: DateTime<Utc>) -> String {
        match self {
            Self::Snapshot => format_timestamp(at),
            Self::Day | Self::Week => self.date_label(at.date_naive()),
        }
    }

    fn date_label(self, day: NaiveDate) -> String {
        match self {
            Self::Week => {
                let week = day.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Snapshot | Self::Day => day_label(day),
        }
    }

    /// First day of the bucket holding `day`; weeks start on Monday
    fn bucket_start(self, day: NaiveDate) -> NaiveDate {
        match self {
            Self::Week => day
                .checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
                .unwrap_or(day),
            Self::Snapshot | Self::Day => day,
        }
    }

    fn step(self) -> Days {
        match self {
            Self::Week => Days::new(7),
            Self::Snapshot | Self::Day => Days::new(1),
        }
    }
}

/// A labelled value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub value: i64,
}

/// Parallel label/count arrays as consumed by charting front-ends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    pub labels: Vec<String>,
    pub counts: Vec<i64>,
}

impl FromIterator<Bucket> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = Bucket>>(iter: I) -> Self {
        let (labels, counts) = iter.into_iter().map(|b| (b.label, b.value)).unzip();
        Self { labels, counts }
    }
}

impl TimeSeries {
    /// Element-wise sum of series sharing the same labels
    pub fn sum(series: &[TimeSeries]) -> Self {
        let Some(first) = series.first() else {
            return Self::default();
        };
        let mut counts = vec![0; first.labels.len()];
        for s in series {
            for (total, value) in counts.iter_mut().zip(&s.counts) {
                *total += value;
            }
        }
        Self {
            labels: first.labels.clone(),
            counts,
        }
    }
}

fn day_label(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// One point per non-empty bucket, in chronological order
pub fn bucket_snapshots(snapshots: &[Snapshot], granularity: Granularity) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    for snap in sorted_by_time(snapshots) {
        let label = granularity.label(snap.timestamp);
        match buckets.last_mut() {
            Some(last) if granularity != Granularity::Snapshot && last.label == label => {
                last.value = snap.member_count;
            }
            _ => buckets.push(Bucket {
                label,
                value: snap.member_count,
            }),
        }
    }
    buckets
}

/// One point per day in `start..=end`; see [`ranged_series`]
pub fn daily_series(snapshots: &[Snapshot], start: NaiveDate, end: NaiveDate) -> Vec<Bucket> {
    ranged_series(snapshots, Granularity::Day, start, end)
}

/// One point per bucket from the one holding `start` to the one holding `end`.
///
/// Empty buckets repeat the previous value; the first bucket is seeded from the last
/// snapshot before the range, or 0 when there is none. Per-snapshot granularity is
/// ranged by day.
pub fn ranged_series(
    snapshots: &[Snapshot],
    granularity: Granularity,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Bucket> {
    let granularity = match granularity {
        Granularity::Snapshot => Granularity::Day,
        other => other,
    };
    let bucket_of = |snap: &Snapshot| granularity.bucket_start(snap.timestamp.date_naive());
    let first = granularity.bucket_start(start);
    let last = granularity.bucket_start(end);

    let sorted = sorted_by_time(snapshots);
    let mut pending = sorted.iter().copied().peekable();
    let mut carried = 0;

    // seed from everything before the range
    while let Some(snap) = pending.next_if(|s| bucket_of(*s) < first) {
        carried = snap.member_count;
    }

    let mut series = Vec::new();
    let mut bucket = first;
    while bucket <= last {
        while let Some(snap) = pending.next_if(|s| bucket_of(*s) == bucket) {
            carried = snap.member_count;
        }
        series.push(Bucket {
            label: granularity.date_label(bucket),
            value: carried,
        });
        let Some(next) = bucket.checked_add_days(granularity.step()) else { break };
        bucket = next;
    }
    series
}

/// Snapshot counts for each of the 24 hours ending with the current hour
pub fn hourly_counts<I>(timestamps: I, now: DateTime<Utc>) -> TimeSeries
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let current_hour = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
    let first_hour = current_hour - Duration::hours(23);

    let mut counts = vec![0_i64; 24];
    for at in timestamps {
        if at < first_hour {
            continue;
        }
        let index = (at - first_hour).num_hours();
        if let Some(slot) = usize::try_from(index).ok().and_then(|i| counts.get_mut(i)) {
            *slot += 1;
        }
    }

    let labels = (0..24)
        .map(|h| (first_hour + Duration::hours(h)).format("%H:00").to_string())
        .collect();
    TimeSeries { labels, counts }
}
