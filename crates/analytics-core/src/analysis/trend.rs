//! Growth trend projector
//!
//! Two-point linear model: the daily rate is measured between the latest snapshot and the
//! one closest to `latest - lookback_days`, then extrapolated. Confidence only reflects
//! the number of samples; it is not a statistical guarantee and predictions are unstable
//! when snapshot cadence is sparse or noisy.

use serde::Serialize;

use super::{closest_to, days_before, fractional_days};
use crate::entities::{sorted_by_time, Snapshot};

/// Trend classification of the daily growth rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendKind {
    InsufficientData,
    RapidGrowth,
    SteadyGrowth,
    SlowGrowth,
    Stable,
    SlowDecline,
    SteadyDecline,
    RapidDecline,
}

impl TrendKind {
    /// Classify a daily member rate
    pub fn classify(daily_rate: f64) -> Self {
        if daily_rate >= 10.0 {
            Self::RapidGrowth
        } else if daily_rate >= 3.0 {
            Self::SteadyGrowth
        } else if daily_rate > 0.0 {
            Self::SlowGrowth
        } else if daily_rate <= -10.0 {
            Self::RapidDecline
        } else if daily_rate <= -3.0 {
            Self::SteadyDecline
        } else if daily_rate < 0.0 {
            Self::SlowDecline
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::RapidGrowth => "rapid_growth",
            Self::SteadyGrowth => "steady_growth",
            Self::SlowGrowth => "slow_growth",
            Self::Stable => "stable",
            Self::SlowDecline => "slow_decline",
            Self::SteadyDecline => "steady_decline",
            Self::RapidDecline => "rapid_decline",
        }
    }

    /// Human readable form ("rapid growth")
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

/// Sample-count confidence bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_samples(samples: usize) -> Self {
        match samples {
            n if n >= 10 => Self::High,
            n if n >= 5 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Output of [`project`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub trend: TrendKind,
    pub growth_rate_daily: f64,
    pub growth_total: i64,
    pub days_measured: f64,
    pub prediction_7_days: Option<i64>,
    pub prediction_30_days: Option<i64>,
    pub confidence: Confidence,
    pub lookback_days: i64,
}

impl TrendResult {
    fn insufficient(lookback_days: i64) -> Self {
        Self {
            trend: TrendKind::InsufficientData,
            growth_rate_daily: 0.0,
            growth_total: 0,
            days_measured: 0.0,
            prediction_7_days: None,
            prediction_30_days: None,
            confidence: Confidence::Low,
            lookback_days,
        }
    }

    #[inline]
    pub fn is_insufficient(&self) -> bool {
        self.trend == TrendKind::InsufficientData
    }
}

/// Project member growth from a guild's snapshots.
///
/// Input order does not matter. Fewer than two snapshots yield
/// [`TrendKind::InsufficientData`] with no predictions.
pub fn project(snapshots: &[Snapshot], lookback_days: i64) -> TrendResult {
    if snapshots.len() < 2 {
        return TrendResult::insufficient(lookback_days);
    }

    let sorted = sorted_by_time(snapshots);
    let (current, earlier) = match sorted.split_last() {
        Some((current, earlier)) => (*current, earlier),
        None => return TrendResult::insufficient(lookback_days),
    };

    let target = days_before(current.timestamp, lookback_days);
    let Some(reference) = closest_to(earlier, target) else {
        return TrendResult::insufficient(lookback_days);
    };

    let elapsed_days = fractional_days(current.timestamp - reference.timestamp).max(1.0);
    let growth_total = current.member_count - reference.member_count;
    let daily_rate = growth_total as f64 / elapsed_days;

    let predict = |horizon: f64| (current.member_count as f64 + daily_rate * horizon).round() as i64;

    TrendResult {
        trend: TrendKind::classify(daily_rate),
        growth_rate_daily: daily_rate,
        growth_total,
        days_measured: (elapsed_days * 10.0).round() / 10.0,
        prediction_7_days: Some(predict(7.0)),
        prediction_30_days: Some(predict(30.0)),
        confidence: Confidence::from_samples(snapshots.len()),
        lookback_days,
    }
}

/// Short, medium and long lookback projections side by side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthHorizons {
    pub short_term: TrendResult,
    pub medium_term: TrendResult,
    pub long_term: TrendResult,
}

impl GrowthHorizons {
    pub const SHORT_DAYS: i64 = 3;
    pub const MEDIUM_DAYS: i64 = 7;
    pub const LONG_DAYS: i64 = 14;

    pub fn analyze(snapshots: &[Snapshot]) -> Self {
        Self {
            short_term: project(snapshots, Self::SHORT_DAYS),
            medium_term: project(snapshots, Self::MEDIUM_DAYS),
            long_term: project(snapshots, Self::LONG_DAYS),
        }
    }
}

/// Next round member count a guild is heading for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub target: i64,
    /// Days until reached at the current rate; `None` when not growing
    pub days_remaining: Option<i64>,
}

impl Milestone {
    /// Milestone ladder: 100, 500, 1000, then every further thousand
    pub fn target_for(members: i64) -> i64 {
        if members >= 1000 {
            // ceil to the next thousand; an exact thousand is its own milestone
            (members + 999) / 1000 * 1000
        } else if members >= 500 {
            1000
        } else if members >= 100 {
            500
        } else {
            100
        }
    }

    pub fn estimate(members: i64, daily_rate: f64) -> Self {
        let target = Self::target_for(members);
        let days_remaining = (daily_rate > 0.0)
            .then(|| ((target - members) as f64 / daily_rate).ceil() as i64);
        Self {
            target,
            days_remaining,
        }
    }
}
