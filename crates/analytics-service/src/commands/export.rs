//! CSV export of a guild's snapshot log

use analytics_core::{format_timestamp, Snapshot, Snowflake};
use chrono::{DateTime, Utc};

use crate::services::{ServiceError, ServiceResult};

pub const CSV_HEADER: [&str; 8] = [
    "timestamp",
    "member_count",
    "channel_count",
    "text_channels",
    "voice_channels",
    "categories",
    "role_count",
    "bots",
];

/// `{guild}_analytics_{YYYYmmdd_HHMMSS}.csv`
pub fn export_filename(guild_id: Snowflake, at: DateTime<Utc>) -> String {
    format!("{guild_id}_analytics_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// One row per snapshot, in the given order
pub fn export_csv(snapshots: &[Snapshot]) -> ServiceResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for snap in snapshots {
        writer
            .write_record([
                format_timestamp(snap.timestamp),
                snap.member_count.to_string(),
                snap.channel_count.to_string(),
                snap.text_channels.to_string(),
                snap.voice_channels.to_string(),
                snap.categories.to_string(),
                snap.role_count.to_string(),
                snap.bot_count.to_string(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::internal(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::internal(e.to_string()))
}

fn csv_error(err: csv::Error) -> ServiceError {
    ServiceError::internal(format!("CSV write failed: {err}"))
}
