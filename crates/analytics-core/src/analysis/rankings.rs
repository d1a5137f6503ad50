//! Demographic rankings: oldest/newest accounts and earliest/latest joins

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::DemographicRecord;
use crate::value_objects::Snowflake;

/// Entries per ranking
pub const RANKING_SIZE: usize = 3;

/// A member and the timestamp it was ranked by
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedMember {
    pub member_id: Snowflake,
    pub name: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemographicRankings {
    pub total: usize,
    pub oldest_accounts: Vec<RankedMember>,
    pub newest_accounts: Vec<RankedMember>,
    pub longest_members: Vec<RankedMember>,
    pub newest_members: Vec<RankedMember>,
}

/// Rank a guild's records. Missing timestamps are excluded from each ranking independently.
pub fn rank_demographics(records: &[DemographicRecord]) -> DemographicRankings {
    let by_created = ranked(records, |r| r.account_created);
    let by_joined = ranked(records, |r| r.joined_at);

    DemographicRankings {
        total: records.len(),
        oldest_accounts: head(&by_created),
        newest_accounts: tail(&by_created),
        longest_members: head(&by_joined),
        newest_members: tail(&by_joined),
    }
}

fn ranked<F>(records: &[DemographicRecord], key: F) -> Vec<RankedMember>
where
    F: Fn(&DemographicRecord) -> Option<DateTime<Utc>>,
{
    let mut ranked: Vec<RankedMember> = records
        .iter()
        .filter_map(|r| {
            key(r).map(|at| RankedMember {
                member_id: r.member_id,
                name: r.name.clone(),
                at,
            })
        })
        .collect();
    ranked.sort_by(|a, b| a.at.cmp(&b.at).then(a.member_id.cmp(&b.member_id)));
    ranked
}

fn head(sorted: &[RankedMember]) -> Vec<RankedMember> {
    sorted.iter().take(RANKING_SIZE).cloned().collect()
}

/// Latest first
fn tail(sorted: &[RankedMember]) -> Vec<RankedMember> {
    sorted.iter().rev().take(RANKING_SIZE).cloned().collect()
}
