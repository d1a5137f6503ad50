//! Request DTOs for API endpoints
//!
//! Bodies implement `Deserialize` and `Validate`; query strings only `Deserialize`
//! unless they carry bounds.

use analytics_core::{Snowflake, SnowflakeParseError};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// Default page size of the member search
pub const DEFAULT_SEARCH_LIMIT: i64 = 250;
/// Deepest offset the member search pages to
pub const MAX_SEARCH_OFFSET: i64 = 1_000_000_000;

// ============================================================================
// Query Strings
// ============================================================================

/// Optional `guild_id` filter shared by the counting endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildFilterQuery {
    pub guild_id: Option<String>,
}

impl GuildFilterQuery {
    /// Blank values mean "all guilds"
    pub fn guild_id(&self) -> Result<Option<Snowflake>, SnowflakeParseError> {
        parse_optional_id(self.guild_id.as_deref())
    }
}

/// GET /api/members_over_time
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MembersOverTimeQuery {
    #[validate(range(min = 1, max = 3650, message = "days must be between 1 and 3650"))]
    pub days: Option<i64>,

    pub guild_id: Option<String>,
}

impl MembersOverTimeQuery {
    pub fn guild_id(&self) -> Result<Option<Snowflake>, SnowflakeParseError> {
        parse_optional_id(self.guild_id.as_deref())
    }
}

/// GET /api/server/:guild_id/snapshots
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SnapshotGroupQuery {
    /// snapshot | day | week
    pub group: Option<String>,

    /// Fill every bucket of the last N days, carrying values forward
    #[validate(range(min = 1, max = 3650, message = "days must be between 1 and 3650"))]
    pub days: Option<i64>,
}

/// Lookback used by the trend and comparison endpoints
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DaysQuery {
    #[validate(range(min = 1, max = 3650, message = "days must be between 1 and 3650"))]
    pub days: Option<i64>,
}

/// GET /api/search_user
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SearchUserQuery {
    #[serde(default)]
    pub q: String,

    pub guild_id: Option<String>,

    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    pub limit: Option<i64>,

    #[validate(range(
        min = 0,
        max = MAX_SEARCH_OFFSET,
        message = "offset must be between 0 and 1000000000"
    ))]
    pub offset: Option<i64>,
}

impl SearchUserQuery {
    pub fn guild_id(&self) -> Result<Option<Snowflake>, SnowflakeParseError> {
        parse_optional_id(self.guild_id.as_deref())
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

/// GET /api/user_history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserHistoryQuery {
    pub member_id: Option<String>,
}

impl UserHistoryQuery {
    /// The member to look up; `None` when absent or blank
    pub fn member_id(&self) -> Result<Option<Snowflake>, SnowflakeParseError> {
        parse_optional_id(self.member_id.as_deref())
    }
}

// ============================================================================
// Bodies
// ============================================================================

/// POST /api/update_config
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateConfigRequest {
    #[validate(required(message = "Missing guild_id or field"))]
    pub guild_id: Option<String>,

    #[validate(required(message = "Missing guild_id or field"))]
    pub field: Option<String>,

    #[serde(default)]
    pub value: Value,
}

/// Optional body of POST /api/fetch_members/:guild_id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchMembersTrigger {
    pub channel_id: Option<String>,
}

/// POST /api/auto_snapshot_notification
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SnapshotNotification {
    #[validate(required(message = "Missing guild_id"))]
    pub guild_id: Option<String>,

    pub guild_name: Option<String>,

    #[serde(default)]
    pub member_count: i64,

    pub timestamp: Option<String>,

    #[serde(default = "default_true")]
    pub is_auto: bool,
}

fn default_true() -> bool {
    true
}

fn parse_optional_id(raw: Option<&str>) -> Result<Option<Snowflake>, SnowflakeParseError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => Snowflake::parse(id).map(Some),
    }
}
