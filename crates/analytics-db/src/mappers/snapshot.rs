//! Snapshot entity <-> model mapper

use analytics_core::{format_timestamp, DomainError, Snapshot};

use super::{parse_id, parse_required_time};
use crate::models::SnapshotModel;

impl TryFrom<SnapshotModel> for Snapshot {
    type Error = DomainError;

    fn try_from(model: SnapshotModel) -> Result<Self, Self::Error> {
        Ok(Snapshot {
            id: Some(model.id),
            guild_id: parse_id(&model.guild_id, "snapshots.guild_id")?,
            guild_name: model.guild_name,
            timestamp: parse_required_time(&model.timestamp, "snapshots.timestamp")?,
            member_count: model.member_count.max(0),
            channel_count: model.channel_count,
            text_channels: model.text_channels,
            voice_channels: model.voice_channels,
            categories: model.categories,
            role_count: model.role_count,
            bot_count: model.bots,
            booster_count: model.boosters,
            is_auto: model.is_auto != 0,
        })
    }
}

/// Snapshot values encoded for insertion
pub struct SnapshotParams<'a> {
    pub guild_id: String,
    pub guild_name: &'a str,
    pub timestamp: String,
    pub member_count: i64,
    pub channel_count: i64,
    pub text_channels: i64,
    pub voice_channels: i64,
    pub categories: i64,
    pub role_count: i64,
    pub bots: i64,
    pub boosters: i64,
    pub is_auto: i64,
}

impl<'a> SnapshotParams<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            guild_id: snapshot.guild_id.to_string(),
            guild_name: &snapshot.guild_name,
            timestamp: format_timestamp(snapshot.timestamp),
            member_count: snapshot.member_count.max(0),
            channel_count: snapshot.channel_count,
            text_channels: snapshot.text_channels,
            voice_channels: snapshot.voice_channels,
            categories: snapshot.categories,
            role_count: snapshot.role_count,
            bots: snapshot.bot_count,
            boosters: snapshot.booster_count,
            is_auto: i64::from(snapshot.is_auto),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> SnapshotModel {
        SnapshotModel {
            id: 7,
            guild_id: "123".to_string(),
            guild_name: "Guild".to_string(),
            timestamp: "2024-03-01T08:00:00".to_string(),
            member_count: 50,
            channel_count: 4,
            text_channels: 2,
            voice_channels: 1,
            categories: 1,
            role_count: 3,
            bots: 1,
            boosters: 2,
            is_auto: 1,
        }
    }

    #[test]
    fn test_model_to_entity() {
        let snapshot = Snapshot::try_from(model()).unwrap();
        assert_eq!(snapshot.id, Some(7));
        assert_eq!(snapshot.guild_id.into_inner(), 123);
        assert_eq!(snapshot.bot_count, 1);
        assert_eq!(snapshot.booster_count, 2);
        assert!(snapshot.is_auto);
        assert_eq!(format_timestamp(snapshot.timestamp), "2024-03-01T08:00:00.000000+00:00");
    }

    #[test]
    fn test_corrupt_rows_are_rejected() {
        let mut bad_id = model();
        bad_id.guild_id = "abc".to_string();
        assert!(matches!(Snapshot::try_from(bad_id), Err(DomainError::CorruptRecord(_))));

        let mut bad_time = model();
        bad_time.timestamp = "yesterday".to_string();
        assert!(matches!(Snapshot::try_from(bad_time), Err(DomainError::CorruptRecord(_))));
    }
}
