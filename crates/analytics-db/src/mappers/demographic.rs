//! DemographicRecord entity <-> model mapper

use analytics_core::{format_timestamp, DemographicRecord, DomainError};

use super::{parse_id, parse_optional_time};
use crate::models::DemographicModel;

impl TryFrom<DemographicModel> for DemographicRecord {
    type Error = DomainError;

    fn try_from(model: DemographicModel) -> Result<Self, Self::Error> {
        Ok(DemographicRecord {
            guild_id: parse_id(&model.guild_id, "demographics.guild_id")?,
            member_id: parse_id(&model.member_id, "demographics.member_id")?,
            name: model.name.unwrap_or_default(),
            account_created: parse_optional_time(model.account_created.as_deref()),
            joined_at: parse_optional_time(model.joined_at.as_deref()),
        })
    }
}

/// Demographic values encoded for upsert
pub struct DemographicParams<'a> {
    pub guild_id: String,
    pub member_id: String,
    pub name: &'a str,
    pub account_created: Option<String>,
    pub joined_at: Option<String>,
}

impl<'a> DemographicParams<'a> {
    pub fn new(record: &'a DemographicRecord) -> Self {
        Self {
            guild_id: record.guild_id.to_string(),
            member_id: record.member_id.to_string(),
            name: &record.name,
            account_created: record.account_created.map(format_timestamp),
            joined_at: record.joined_at.map(format_timestamp),
        }
    }
}
