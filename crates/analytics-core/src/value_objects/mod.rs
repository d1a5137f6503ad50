//! Value objects - immutable types that represent domain concepts

mod snowflake;
mod timestamp;

pub use snowflake::{Snowflake, SnowflakeParseError};
pub use timestamp::{format_timestamp, parse_timestamp};
