//! Demographic record - per-member facts refreshed on every member fetch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::guild_state::MemberInfo;
use crate::value_objects::Snowflake;

/// One row per (guild_id, member_id); later fetches overwrite earlier ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicRecord {
    pub guild_id: Snowflake,
    pub member_id: Snowflake,
    pub name: String,
    pub account_created: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl DemographicRecord {
    pub fn from_member(guild_id: Snowflake, member: &MemberInfo) -> Self {
        Self {
            guild_id,
            member_id: member.id,
            name: member.name.clone(),
            account_created: member.account_created.or_else(|| member.id.created_at()),
            joined_at: member.joined_at,
        }
    }
}
