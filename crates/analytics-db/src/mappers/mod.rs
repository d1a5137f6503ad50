//! Model to entity mappers
//!
//! - `TryFrom<Model> for Entity`: convert database rows to domain objects, rejecting
//!   unparseable ids and timestamps as `DomainError::CorruptRecord`
//! - `*Params` structs: entity values encoded for binding

mod config;
mod demographic;
mod snapshot;

pub use config::ConfigParams;
pub use demographic::DemographicParams;
pub use snapshot::SnapshotParams;

use analytics_core::{parse_timestamp, DomainError, Snowflake};
use chrono::{DateTime, Utc};

pub(crate) fn parse_id(raw: &str, column: &str) -> Result<Snowflake, DomainError> {
    Snowflake::parse(raw)
        .map_err(|e| DomainError::CorruptRecord(format!("{column} '{raw}': {e}")))
}

pub(crate) fn parse_required_time(raw: &str, column: &str) -> Result<DateTime<Utc>, DomainError> {
    parse_timestamp(raw)
        .ok_or_else(|| DomainError::CorruptRecord(format!("{column} '{raw}' is not a timestamp")))
}

/// Unparseable optional timestamps read as unknown
pub(crate) fn parse_optional_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(parse_timestamp)
}
