//! Domain entities - core business objects

mod config;
mod demographic;
mod guild_state;
mod snapshot;

pub use config::{ConfigField, GuildConfig};
pub use demographic::DemographicRecord;
pub use guild_state::{ChannelCounts, ChannelInfo, ChannelKind, GuildState, MemberInfo};
pub use snapshot::Snapshot;

pub(crate) use snapshot::sorted_by_time;
#[cfg(test)]
pub(crate) use snapshot::test_support;
