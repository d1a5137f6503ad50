//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use analytics_core::analysis::{DemographicRankings, RankedMember};
use analytics_core::{
    DemographicRecord, GuildConfig, Milestone, PeriodComparison, Snowflake, TrendResult,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// `YYYY-MM-DD HH:MM`, as shown on the dashboard
pub(crate) fn minute_label(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// `YYYY-MM-DD HH:MM:SS`, or empty when unknown
fn second_label(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

// ============================================================================
// Common Response Types
// ============================================================================

/// `{count}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

/// `{success, message}`
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Liveness check body
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

// ============================================================================
// Server Responses
// ============================================================================

/// Entry of GET /api/servers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSummary {
    pub id: Snowflake,
    pub name: String,
}

/// One point of a guild's snapshot log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotPoint {
    /// Raw timestamp, day (`YYYY-MM-DD`) or ISO week (`YYYY-Www`) depending on grouping
    pub timestamp: String,
    pub member_count: i64,
}

/// GET /api/server/:guild_id/stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatsResponse {
    pub peak_member_count: i64,
    pub peak_member_date: String,
    pub current_member_count: i64,
    pub current_boosters: i64,
    /// Signed, e.g. `+12` or `-3`
    pub change_since_first: String,
    pub last_snapshot: String,
    pub time_since_last: String,
    pub total_snapshots: usize,
}

/// Rolling 24 hour window of a counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowStats {
    pub total: i64,
    /// `total - count(before cutoff)`
    pub delta: i64,
    pub last_24h: i64,
}

/// GET /api/24hr_stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats24hResponse {
    pub snapshots: WindowStats,
    pub servers: WindowStats,
    pub members: WindowStats,
}

// ============================================================================
// Demographics Responses
// ============================================================================

/// A ranked member. Exactly one of the timestamp fields is set, matching the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedMemberResponse {
    pub member_id: Snowflake,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
}

impl RankedMemberResponse {
    fn created(member: &RankedMember) -> Self {
        Self {
            member_id: member.member_id,
            name: member.name.clone(),
            account_created: Some(utc_label(member.at)),
            joined_at: None,
        }
    }

    fn joined(member: &RankedMember) -> Self {
        Self {
            member_id: member.member_id,
            name: member.name.clone(),
            account_created: None,
            joined_at: Some(utc_label(member.at)),
        }
    }
}

fn utc_label(at: DateTime<Utc>) -> String {
    format!("{} UTC", minute_label(at))
}

/// GET /api/server/:guild_id/demographics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemographicsResponse {
    pub total: usize,
    pub oldest_accounts: Vec<RankedMemberResponse>,
    pub newest_accounts: Vec<RankedMemberResponse>,
    pub longest_members: Vec<RankedMemberResponse>,
    pub newest_members: Vec<RankedMemberResponse>,
}

impl From<&DemographicRankings> for DemographicsResponse {
    fn from(rankings: &DemographicRankings) -> Self {
        Self {
            total: rankings.total,
            oldest_accounts: rankings.oldest_accounts.iter().map(RankedMemberResponse::created).collect(),
            newest_accounts: rankings.newest_accounts.iter().map(RankedMemberResponse::created).collect(),
            longest_members: rankings.longest_members.iter().map(RankedMemberResponse::joined).collect(),
            newest_members: rankings.newest_members.iter().map(RankedMemberResponse::joined).collect(),
        }
    }
}

/// One row of the member search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSearchResult {
    pub member_id: Snowflake,
    pub name: String,
    pub account_created: String,
    pub joined_at: String,
    pub guild_id: Snowflake,
}

impl From<DemographicRecord> for MemberSearchResult {
    fn from(record: DemographicRecord) -> Self {
        Self {
            member_id: record.member_id,
            account_created: second_label(record.account_created),
            joined_at: second_label(record.joined_at),
            guild_id: record.guild_id,
            name: record.name,
        }
    }
}

/// GET /api/search_user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<MemberSearchResult>,
    pub total: i64,
    pub has_more: bool,
    pub offset: i64,
    pub limit: i64,
}

// ============================================================================
// Config Responses
// ============================================================================

/// Entry of GET /api/server_configs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfigResponse {
    pub guild_id: Snowflake,
    pub guild_name: String,
    pub auto_snapshot: bool,
    pub last_auto_snapshot: Option<DateTime<Utc>>,
    pub last_snapshot: Option<DateTime<Utc>>,
    pub first_snapshot_date: Option<DateTime<Utc>>,
    pub chart_style: String,
    pub snapshot_retention_days: i64,
    pub auto_snapshot_interval_hours: f64,
}

impl ServerConfigResponse {
    pub fn new(
        config: GuildConfig,
        guild_name: Option<String>,
        last_snapshot: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            guild_name: guild_name.unwrap_or_else(|| format!("Server {}", config.guild_id)),
            guild_id: config.guild_id,
            auto_snapshot: config.auto_snapshot,
            last_auto_snapshot: config.last_auto_snapshot,
            last_snapshot,
            first_snapshot_date: config.first_snapshot_date,
            chart_style: config.chart_style,
            snapshot_retention_days: config.snapshot_retention_days,
            auto_snapshot_interval_hours: config.auto_snapshot_interval_hours,
        }
    }
}

// ============================================================================
// Analysis Responses
// ============================================================================

/// GET /api/server/:guild_id/trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResponse {
    pub guild_id: Snowflake,
    pub current_members: Option<i64>,
    #[serde(flatten)]
    pub trend: TrendResult,
    pub milestone: Option<Milestone>,
}

/// GET /api/server/:guild_id/compare
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareResponse {
    pub guild_id: Snowflake,
    pub days: i64,
    pub insufficient_data: bool,
    pub comparison: Option<PeriodComparison>,
}

// ============================================================================
// Trigger Responses
// ============================================================================

/// POST /api/fetch_members/:guild_id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchMembersResponse {
    pub success: bool,
    pub message: String,
    pub members_fetched: i64,
    pub guild_name: String,
}

/// POST /api/take_snapshot/:guild_id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TakeSnapshotResponse {
    pub success: bool,
    pub message: String,
    pub member_count: i64,
    pub guild_name: String,
}

/// POST /api/snapshot_all and /api/fetch_all
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepResponse {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
