//! Dashboard actions forwarded to the bot gateway

use analytics_core::Snowflake;
use tracing::{info, instrument};

use crate::clients::BotTrigger;
use crate::dto::{FetchMembersResponse, SnapshotNotification, SuccessResponse, TakeSnapshotResponse};

use super::error::{ServiceError, ServiceResult};

/// Trigger service
pub struct TriggerService<'a> {
    trigger: &'a dyn BotTrigger,
}

impl<'a> TriggerService<'a> {
    pub fn new(trigger: &'a dyn BotTrigger) -> Self {
        Self { trigger }
    }

    /// Ask the bot to refresh a guild's demographics
    #[instrument(skip(self))]
    pub async fn fetch_members(
        &self,
        guild_id: Snowflake,
        channel_id: Option<&str>,
    ) -> ServiceResult<FetchMembersResponse> {
        let channel_id = match channel_id.map(str::trim).filter(|c| !c.is_empty()) {
            Some(raw) => Some(
                Snowflake::parse(raw)
                    .map_err(|_| ServiceError::validation("Invalid channel_id format"))?,
            ),
            None => None,
        };

        let response = self.trigger.fetch_members(guild_id, channel_id).await?;
        info!(guild_id = %guild_id, fetched = response.members_fetched, "Member fetch triggered");

        Ok(FetchMembersResponse {
            success: true,
            message: response.message,
            members_fetched: response.members_fetched,
            guild_name: response.guild_name,
        })
    }

    /// Ask the bot for a manual snapshot
    #[instrument(skip(self))]
    pub async fn take_snapshot(&self, guild_id: Snowflake) -> ServiceResult<TakeSnapshotResponse> {
        let response = self.trigger.take_snapshot(guild_id).await?;
        info!(guild_id = %guild_id, members = response.member_count, "Snapshot triggered");

        Ok(TakeSnapshotResponse {
            success: true,
            message: format!("Snapshot taken successfully for server {guild_id}"),
            member_count: response.member_count,
            guild_name: response.guild_name,
        })
    }
}

/// Log a snapshot notice sent by the bot
pub fn record_notification(notice: &SnapshotNotification) -> ServiceResult<SuccessResponse> {
    let guild_id = notice
        .guild_id
        .as_deref()
        .ok_or_else(|| ServiceError::validation("Missing guild_id"))
        .and_then(|raw| {
            Snowflake::parse(raw).map_err(|_| ServiceError::validation("Invalid guild_id format"))
        })?;

    let kind = if notice.is_auto { "Auto" } else { "Manual" };
    let guild_name = notice
        .guild_name
        .clone()
        .unwrap_or_else(|| format!("Server {guild_id}"));
    info!(
        guild_id = %guild_id,
        guild_name = %guild_name,
        member_count = notice.member_count,
        timestamp = notice.timestamp.as_deref().unwrap_or("unknown"),
        "{kind} snapshot notification received"
    );

    Ok(SuccessResponse::with_message(format!(
        "{kind} snapshot logged successfully"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::FakeTrigger;

    #[tokio::test]
    async fn test_take_snapshot_message() {
        let trigger = FakeTrigger::default();
        let response = TriggerService::new(&trigger)
            .take_snapshot(Snowflake::new(8))
            .await
            .unwrap();
        assert_eq!(response.message, "Snapshot taken successfully for server 8");
        assert_eq!(response.member_count, 42);
    }

    #[tokio::test]
    async fn test_rejection_keeps_gateway_status() {
        let trigger = FakeTrigger {
            failing: vec![Snowflake::new(8)],
            ..Default::default()
        };
        let err = TriggerService::new(&trigger)
            .fetch_members(Snowflake::new(8), None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_bad_channel_hint() {
        let trigger = FakeTrigger::default();
        let err = TriggerService::new(&trigger)
            .fetch_members(Snowflake::new(8), Some("general"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(trigger.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_notification_message() {
        let notice = SnapshotNotification {
            guild_id: Some("5".to_string()),
            guild_name: None,
            member_count: 10,
            timestamp: None,
            is_auto: false,
        };
        let response = record_notification(&notice).unwrap();
        assert_eq!(response.message.as_deref(), Some("Manual snapshot logged successfully"));
    }
}
