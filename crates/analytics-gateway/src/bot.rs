//! Embedding surface for the bot process

use std::sync::Arc;

use analytics_common::ApiToken;
use analytics_core::{DomainError, GuildSource, Snowflake};
use analytics_service::{
    AutoSnapshotOutcome, CollectorService, CommandDispatcher, CommandReply, ServiceContext,
    ServiceResult,
};
use tracing::{debug, instrument};

use crate::server::GatewayState;

/// Prefix of the chat command
pub const COMMAND_PREFIX: &str = "analytics";

/// The add-on as seen from the bot: chat commands, activity hooks and the trigger API state
#[derive(Clone)]
pub struct AnalyticsBot {
    ctx: Arc<ServiceContext>,
    source: Arc<dyn GuildSource>,
}

impl AnalyticsBot {
    pub fn new(ctx: Arc<ServiceContext>, source: Arc<dyn GuildSource>) -> Self {
        Self { ctx, source }
    }

    /// Reuse the store and guild source of a gateway state
    pub fn from_gateway(state: &GatewayState) -> Self {
        Self::new(state.context_handle(), state.source_handle())
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Answer a chat message if it is an `analytics` command
    pub async fn on_message(&self, guild_id: Snowflake, content: &str) -> Option<CommandReply> {
        let rest = strip_command(content)?;
        Some(self.handle_command(guild_id, rest).await)
    }

    /// Run the words after the command prefix
    pub async fn handle_command(&self, guild_id: Snowflake, input: &str) -> CommandReply {
        CommandDispatcher::new(&self.ctx, self.source.as_ref())
            .dispatch(guild_id, input)
            .await
    }

    /// Activity hook: with probability `auto_sample_rate`, take an automatic
    /// snapshot when one is due
    #[instrument(skip(self))]
    pub async fn on_guild_activity(&self, guild_id: Snowflake) -> ServiceResult<AutoSnapshotOutcome> {
        let guild = self
            .source
            .guild(guild_id)
            .await?
            .ok_or(DomainError::GuildNotFound(guild_id))?;
        let outcome = CollectorService::new(&self.ctx)
            .maybe_auto_snapshot(&guild)
            .await?;
        debug!(guild_id = %guild_id, ?outcome, "Activity hook");
        Ok(outcome)
    }

    /// State for the trigger API sharing this bot's store and source
    pub fn gateway_state(&self, token: ApiToken) -> GatewayState {
        GatewayState::new(self.ctx.clone(), self.source.clone(), token)
    }
}

impl std::fmt::Debug for AnalyticsBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsBot")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

/// `analytics status` → `Some("status")`; the prefix alone → `Some("")`
fn strip_command(content: &str) -> Option<&str> {
    let trimmed = content.trim_start();
    let head = trimmed.get(..COMMAND_PREFIX.len())?;
    if !head.eq_ignore_ascii_case(COMMAND_PREFIX) {
        return None;
    }
    let rest = &trimmed[COMMAND_PREFIX.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_command() {
        assert_eq!(strip_command("analytics status"), Some("status"));
        assert_eq!(strip_command("  Analytics   rep "), Some("rep"));
        assert_eq!(strip_command("analytics"), Some(""));
        assert_eq!(strip_command("analyticsx"), None);
        assert_eq!(strip_command("hello"), None);
        assert_eq!(strip_command("ana"), None);
    }
}
