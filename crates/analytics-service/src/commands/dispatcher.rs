//! Runs parsed commands against the services

use analytics_core::{ConfigField, CountWindow, DomainError, GuildSource, GuildState, Snowflake};
use chrono::Utc;
use tracing::{debug, instrument, warn};

use super::export::{export_csv, export_filename};
use super::render;
use super::{Attachment, Command, CommandReply, DemographicsAction};
use crate::services::{
    CollectorService, ConfigService, DemographicsService, InsightService, MaintenanceService,
    ServiceContext, ServiceError, ServiceResult, SweepService,
};

/// Executes `analytics` commands for one invoking guild
pub struct CommandDispatcher<'a> {
    ctx: &'a ServiceContext,
    source: &'a dyn GuildSource,
}

impl<'a> CommandDispatcher<'a> {
    pub fn new(ctx: &'a ServiceContext, source: &'a dyn GuildSource) -> Self {
        Self { ctx, source }
    }

    /// Parse and run a command. Failures become an `error: ...` reply.
    #[instrument(skip(self))]
    pub async fn dispatch(&self, guild_id: Snowflake, input: &str) -> CommandReply {
        let command = Command::parse(input);
        debug!(guild_id = %guild_id, ?command, "Running command");

        match self.run(guild_id, command).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(guild_id = %guild_id, error = %e, "Command failed");
                CommandReply::text(format!("error: {e}"))
            }
        }
    }

    pub async fn run(&self, guild_id: Snowflake, command: Command) -> ServiceResult<CommandReply> {
        let text = match command {
            Command::Help => render::HELP.to_string(),
            Command::Snapshot => {
                let state = self.guild(guild_id).await?;
                let snapshot = CollectorService::new(self.ctx).capture(&state, false).await?;
                render::snapshot(&snapshot)
            }
            Command::Report => self.report(guild_id).await?,
            Command::Clear => {
                MaintenanceService::new(self.ctx).clear(guild_id).await?;
                format!(
                    "analytics data for {} has been cleared.",
                    self.guild_name(guild_id).await?
                )
            }
            Command::Status => {
                let config = ConfigService::new(self.ctx).get(guild_id).await?;
                let total = self
                    .ctx
                    .snapshot_repo()
                    .count(Some(guild_id), CountWindow::All)
                    .await?;
                render::status(&self.guild_name(guild_id).await?, &config, total)
            }
            Command::Members => {
                let runs = InsightService::new(self.ctx).history(guild_id).await?;
                render::members(&self.guild_name(guild_id).await?, &runs)
            }
            Command::Trend => match InsightService::new(self.ctx).horizons(guild_id).await? {
                Some((latest, horizons)) => {
                    render::trend(latest.member_count, &horizons, latest.timestamp)
                }
                None => {
                    "not enough data for trend analysis. please take at least 2 snapshots."
                        .to_string()
                }
            },
            Command::Compare { days } => {
                let response = InsightService::new(self.ctx).compare(guild_id, days).await?;
                match response.comparison {
                    Some(comparison) => render::compare(&comparison),
                    None => {
                        "not enough data for comparison. please take at least 2 snapshots."
                            .to_string()
                    }
                }
            }
            Command::Export => return self.export(guild_id).await,
            Command::Auto(Some(enabled)) => {
                ConfigService::new(self.ctx)
                    .set(guild_id, ConfigField::AutoSnapshot(enabled))
                    .await?;
                if enabled {
                    "automatic daily snapshots enabled".to_string()
                } else {
                    "automatic daily snapshots disabled".to_string()
                }
            }
            Command::Auto(None) => {
                let config = ConfigService::new(self.ctx).get(guild_id).await?;
                render::auto_status(config.auto_snapshot)
            }
            Command::Retention(Some(days)) => {
                ConfigService::new(self.ctx)
                    .set(guild_id, ConfigField::retention_days(days)?)
                    .await?;
                format!("data retention set to {days} days")
            }
            Command::Retention(None) => {
                let config = ConfigService::new(self.ctx).get(guild_id).await?;
                format!("data retention is {} days", config.snapshot_retention_days)
            }
            Command::Interval(Some(hours)) => {
                ConfigService::new(self.ctx)
                    .set(guild_id, ConfigField::interval_hours(hours)?)
                    .await?;
                format!("automatic snapshot interval set to {} hours", render::hours(hours))
            }
            Command::Interval(None) => {
                let config = ConfigService::new(self.ctx).get(guild_id).await?;
                format!(
                    "automatic snapshot interval is {} hours",
                    render::hours(config.auto_snapshot_interval_hours)
                )
            }
            Command::Demographics(action) => self.demographics(guild_id, action).await?,
            Command::DbStats => {
                let stats = MaintenanceService::new(self.ctx).stats(guild_id).await?;
                render::db_stats(&stats)
            }
            Command::Holylogger => {
                let summary = SweepService::new(self.ctx).holylogger(self.source).await?;
                render::holylogger(&summary)
            }
            Command::Boosters => {
                let state = self.guild(guild_id).await?;
                match state.booster_count {
                    0 => "This server has no boosters.".to_string(),
                    1 => format!("{} has **1** booster.", state.name),
                    n => format!("{} has **{}** boosters.", state.name, render::grouped(n)),
                }
            }
            Command::Prune => {
                let retention = ConfigService::new(self.ctx)
                    .get(guild_id)
                    .await?
                    .snapshot_retention_days;
                let removed = MaintenanceService::new(self.ctx).prune(guild_id).await?;
                format!("removed {removed} snapshot(s) older than {retention} days")
            }
            Command::Reset { confirmed: false } => render::RESET_WARNING.to_string(),
            Command::Reset { confirmed: true } => {
                let wiped = MaintenanceService::new(self.ctx).reset().await?;
                format!(
                    "✅ Analytics database has been wiped. Removed {} snapshots, {} demographic records, \
                     {} server configs and {} tracked servers.",
                    wiped.snapshots, wiped.demographics, wiped.server_configs, wiped.tracked_guilds
                )
            }
            Command::InvalidArgument => render::INVALID_ARGUMENT.to_string(),
            Command::Unknown(input) => {
                format!("command \"{input}\" not found, use analytics help for a list of commands.")
            }
        };
        Ok(CommandReply::text(text))
    }

    // ========================================================================
    // Commands with more than one outcome
    // ========================================================================

    async fn report(&self, guild_id: Snowflake) -> ServiceResult<String> {
        let report = match InsightService::new(self.ctx).report(guild_id).await? {
            Ok(report) => report,
            Err(found) => return Ok(render::report_unavailable(found)),
        };
        // live booster count when the guild is visible, else the stored one
        let (name, boosters) = match self.source.guild(guild_id).await? {
            Some(state) => (state.name, state.booster_count),
            None => (report.latest.guild_name.clone(), report.latest.booster_count),
        };
        Ok(render::report(&name, &report, boosters))
    }

    async fn export(&self, guild_id: Snowflake) -> ServiceResult<CommandReply> {
        let snapshots = self.ctx.snapshot_repo().find_by_guild(guild_id).await?;
        if snapshots.is_empty() {
            return Ok(CommandReply::text("no analytics data available to export."));
        }

        let filename = export_filename(guild_id, Utc::now());
        let content = export_csv(&snapshots)?;
        let text = format!(
            "analytics data export complete\n\nfile: `{filename}`\nsnapshots: {}\nformat: csv (comma-separated values)",
            snapshots.len()
        );
        Ok(CommandReply::with_attachment(text, Attachment { filename, content }))
    }

    async fn demographics(
        &self,
        guild_id: Snowflake,
        action: DemographicsAction,
    ) -> ServiceResult<String> {
        let service = DemographicsService::new(self.ctx);

        match action {
            DemographicsAction::Summary => {
                let mut notice = String::new();
                let mut rankings = service.summary(guild_id).await?;
                if rankings.total == 0 {
                    match service.fetch(self.source, guild_id, None).await {
                        Ok(outcome) => {
                            notice = format!(
                                "Initial demographics data populated/updated for {} members.\n\n",
                                outcome.members_fetched
                            );
                            rankings = service.summary(guild_id).await?;
                        }
                        Err(e) => return Ok(fetch_failure(&e)),
                    }
                }
                if rankings.total == 0 {
                    return Ok("no demographics data found for this server.".to_string());
                }
                Ok(format!("{notice}{}", render::demographics(&rankings)))
            }
            DemographicsAction::Fetch(channel) => {
                let hint = match channel.as_deref().map(Snowflake::parse).transpose() {
                    Ok(hint) => hint,
                    Err(_) => return Ok(render::BAD_CHANNEL.to_string()),
                };
                match service.fetch(self.source, guild_id, hint).await {
                    Ok(outcome) => Ok(format!(
                        "Fetched/updated demographics for {} members. Total tracked: {}.",
                        outcome.members_fetched, outcome.total_tracked
                    )),
                    Err(e) => Ok(fetch_failure(&e)),
                }
            }
            DemographicsAction::List => {
                let tracked = service.list_tracked().await?;
                if tracked.is_empty() {
                    return Ok("no servers are currently tracked for demographics.".to_string());
                }
                let ids: Vec<String> = tracked.iter().map(Snowflake::to_string).collect();
                Ok(format!("tracked servers:\n{}", ids.join("\n")))
            }
            DemographicsAction::Remove(raw) => {
                let Ok(id) = Snowflake::parse(raw.trim()) else {
                    return Ok(render::DEMOGRAPHICS_USAGE.to_string());
                };
                if service.remove_tracked(id).await? {
                    Ok(format!("server `{id}` removed from demographics tracking."))
                } else {
                    Ok(format!("server `{id}` is not tracked for demographics."))
                }
            }
            DemographicsAction::Usage => Ok(render::DEMOGRAPHICS_USAGE.to_string()),
        }
    }

    // ========================================================================
    // Guild lookups
    // ========================================================================

    async fn guild(&self, guild_id: Snowflake) -> ServiceResult<GuildState> {
        self.source
            .guild(guild_id)
            .await?
            .ok_or_else(|| DomainError::GuildNotFound(guild_id).into())
    }

    /// Live name, else the latest stored name, else `server {id}`
    async fn guild_name(&self, guild_id: Snowflake) -> ServiceResult<String> {
        if let Some(state) = self.source.guild(guild_id).await? {
            return Ok(state.name);
        }
        Ok(self
            .ctx
            .snapshot_repo()
            .latest(guild_id)
            .await?
            .map(|s| s.guild_name)
            .unwrap_or_else(|| format!("server {guild_id}")))
    }
}

fn fetch_failure(err: &ServiceError) -> String {
    match err {
        ServiceError::Domain(DomainError::NoReadableChannel(_)) => render::NO_CHANNEL.to_string(),
        ServiceError::Domain(DomainError::UnusableChannel(_)) => render::BAD_CHANNEL.to_string(),
        other => format!(
            "Failed to fetch members: {other}\nIf this is a channel error, try `analytics demographics fetch <channel_id>`."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{at, guild, member, memory_context, FakeSource};
    use analytics_core::ChannelKind;

    fn source() -> FakeSource {
        FakeSource::new(vec![guild(1, "Alpha", 120), guild(2, "Beta", 40)]).with_members(
            1,
            vec![
                member(11, "ann", at(1, 0), at(2, 0)),
                member(12, "bob", at(3, 0), at(4, 0)),
            ],
        )
    }

    async fn say(ctx: &ServiceContext, source: &FakeSource, input: &str) -> CommandReply {
        CommandDispatcher::new(ctx, source)
            .dispatch(Snowflake::new(1), input)
            .await
    }

    #[tokio::test]
    async fn test_snapshot_then_status() {
        let ctx = memory_context().await;
        let source = source();

        let reply = say(&ctx, &source, "ss").await;
        assert!(reply.text.starts_with("**new snapshot**"));
        assert!(reply.text.contains("**server**: Alpha"));
        assert!(reply.text.contains("**members**: 120"));

        let status = say(&ctx, &source, "status").await.text;
        assert!(status.contains("**analytics status for Alpha**"));
        assert!(status.contains("• total snapshots: 1"));
        assert!(status.contains("• auto snapshot: disabled"));
        assert!(status.contains("• last auto snapshot: never"));
    }

    #[tokio::test]
    async fn test_report_needs_two_snapshots() {
        let ctx = memory_context().await;
        let source = source();

        let reply = say(&ctx, &source, "report").await;
        assert!(reply.text.contains("Found only 0 snapshot(s)"));

        let collector = CollectorService::new(&ctx);
        collector.capture_at(&guild(1, "Alpha", 100), at(1, 0), false).await.unwrap();
        collector.capture_at(&guild(1, "Alpha", 170), at(8, 0), false).await.unwrap();

        let report = say(&ctx, &source, "rep").await.text;
        assert!(report.contains("• total members: **170**"));
        assert!(report.contains("• peak members: **170** (0)"));
        assert!(report.contains("• member growth: **+70** members total"));
        assert!(report.contains("• growth rate: **70.00%**"));
        assert!(report.contains("• current trend: **rapid growth**"));
        assert!(report.contains("• next milestone: **500** members"));
        assert!(report.contains("• server boosters: **2**"));
    }

    #[tokio::test]
    async fn test_config_commands() {
        let ctx = memory_context().await;
        let source = source();

        assert_eq!(say(&ctx, &source, "auto on").await.text, "automatic daily snapshots enabled");
        assert_eq!(say(&ctx, &source, "ret 14").await.text, "data retention set to 14 days");
        assert_eq!(say(&ctx, &source, "retention").await.text, "data retention is 14 days");
        assert_eq!(
            say(&ctx, &source, "int 12").await.text,
            "automatic snapshot interval set to 12.0 hours"
        );
        assert_eq!(
            say(&ctx, &source, "interval").await.text,
            "automatic snapshot interval is 12.0 hours"
        );
        assert_eq!(
            say(&ctx, &source, "interval -1").await.text,
            "error: auto_snapshot_interval_hours must be a positive number"
        );
        assert!(say(&ctx, &source, "auto").await.text.contains("currently enabled"));

        let config = ctx.config_repo().find(Snowflake::new(1)).await.unwrap().unwrap();
        assert!(config.auto_snapshot);
        assert_eq!(config.snapshot_retention_days, 14);
    }

    #[tokio::test]
    async fn test_out_of_range_arguments_are_rejected() {
        let ctx = memory_context().await;
        let source = source();
        let collector = CollectorService::new(&ctx);
        collector.capture_at(&guild(1, "Alpha", 100), at(1, 0), false).await.unwrap();
        collector.capture_at(&guild(1, "Alpha", 120), at(8, 0), true).await.unwrap();

        assert_eq!(
            say(&ctx, &source, "compare 200000000").await.text,
            render::INVALID_ARGUMENT
        );
        assert_eq!(
            say(&ctx, &source, "retention 1000000000000").await.text,
            "error: snapshot_retention_days must be at most 36500"
        );
        assert_eq!(
            say(&ctx, &source, "interval 1e300").await.text,
            "error: auto_snapshot_interval_hours must be at most 8760"
        );

        assert!(say(&ctx, &source, "prune").await.text.starts_with("removed "));
        say(&ctx, &source, "auto on").await;
        let status = say(&ctx, &source, "status").await.text;
        assert!(status.contains("• data retention: 90 days"));
        assert!(status.contains("• next auto snapshot:"));
    }

    #[tokio::test]
    async fn test_export_attaches_csv() {
        let ctx = memory_context().await;
        let source = source();
        assert_eq!(
            say(&ctx, &source, "export").await.text,
            "no analytics data available to export."
        );

        say(&ctx, &source, "snapshot").await;
        let reply = say(&ctx, &source, "exp").await;
        let attachment = reply.attachment.unwrap();
        assert!(attachment.filename.starts_with("1_analytics_"));
        assert!(attachment.filename.ends_with(".csv"));
        assert_eq!(attachment.content.lines().count(), 2);
        assert!(reply.text.contains("snapshots: 1"));
    }

    #[tokio::test]
    async fn test_demographics_summary_fetches_when_empty() {
        let ctx = memory_context().await;
        let source = source();

        let text = say(&ctx, &source, "demo").await.text;
        assert!(text.starts_with("Initial demographics data populated/updated for 2 members."));
        assert!(text.contains("• oldest tracked: ann (2024-03-01)"));
        assert!(text.contains("• newest tracked: bob (joined 2024-03-04)"));
        assert!(text.contains("*total tracked: 2*"));

        let list = say(&ctx, &source, "demographics list").await.text;
        assert_eq!(list, "tracked servers:\n1");

        let removed = say(&ctx, &source, "demographics remove 1").await.text;
        assert_eq!(removed, "server `1` removed from demographics tracking.");
        assert_eq!(
            say(&ctx, &source, "demographics list").await.text,
            "no servers are currently tracked for demographics."
        );
    }

    #[tokio::test]
    async fn test_demographics_fetch_channel_errors() {
        let ctx = memory_context().await;
        let source = source();

        // hidden text channel
        let text = say(&ctx, &source, "demographics fetch 12").await.text;
        assert_eq!(text, render::BAD_CHANNEL);
        assert_eq!(say(&ctx, &source, "demographics fetch abc").await.text, render::BAD_CHANNEL);

        let text = say(&ctx, &source, "demographics fetch 11").await.text;
        assert_eq!(text, "Fetched/updated demographics for 2 members. Total tracked: 2.");

        let mut hidden = guild(1, "Alpha", 120);
        for channel in &mut hidden.channels {
            if channel.kind == ChannelKind::Text {
                channel.readable = false;
            }
        }
        let blind = FakeSource::new(vec![hidden]);
        assert_eq!(say(&ctx, &blind, "demographics fetch").await.text, render::NO_CHANNEL);
    }

    #[tokio::test]
    async fn test_members_and_trend() {
        let ctx = memory_context().await;
        let source = source();
        assert_eq!(
            say(&ctx, &source, "tr").await.text,
            "not enough data for trend analysis. please take at least 2 snapshots."
        );

        let collector = CollectorService::new(&ctx);
        collector.capture_at(&guild(1, "Alpha", 100), at(1, 0), false).await.unwrap();
        collector.capture_at(&guild(1, "Alpha", 110), at(2, 0), true).await.unwrap();

        let members = say(&ctx, &source, "mem").await.text;
        assert!(members.contains("**current members:** 110 (+10)"));

        let trend = say(&ctx, &source, "trend").await.text;
        assert!(trend.starts_with("## member growth analysis"));
        assert!(trend.contains("**current members:** 110"));
        assert!(trend.contains("• total change: **+10** members"));
    }

    #[tokio::test]
    async fn test_compare_and_clear() {
        let ctx = memory_context().await;
        let source = source();
        assert_eq!(
            say(&ctx, &source, "cmp").await.text,
            "not enough data for comparison. please take at least 2 snapshots."
        );

        let collector = CollectorService::new(&ctx);
        collector.capture_at(&guild(1, "Alpha", 200), at(1, 0), false).await.unwrap();
        collector.capture_at(&guild(1, "Alpha", 250), at(8, 0), false).await.unwrap();

        let text = say(&ctx, &source, "compare 7").await.text;
        assert!(text.contains("**time period:** 7.0 days"));
        assert!(text.contains("• change: **+50** members (+25.00%)"));

        assert_eq!(
            say(&ctx, &source, "clr").await.text,
            "analytics data for Alpha has been cleared."
        );
        assert_eq!(
            ctx.snapshot_repo().count(Some(Snowflake::new(1)), CountWindow::All).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_reset_and_holylogger() {
        let ctx = memory_context().await;
        let source = source();

        assert!(say(&ctx, &source, "reset").await.text.contains("DANGER ZONE"));
        say(&ctx, &source, "ss").await;

        let text = say(&ctx, &source, "holy").await.text;
        assert!(text.starts_with("**HOLYLOGGER COMPLETE**"));
        assert!(text.contains("• Unmonitored servers found: 1"));
        assert_eq!(
            say(&ctx, &source, "holylogger").await.text,
            "All servers are already being monitored! No action needed."
        );

        let text = say(&ctx, &source, "reset confirm").await.text;
        assert!(text.contains("Removed 2 snapshots"));
        assert!(say(&ctx, &source, "dbstats").await.text.contains("• Snapshots: 0"));
    }

    #[tokio::test]
    async fn test_unknown_and_boosters() {
        let ctx = memory_context().await;
        let source = source();
        assert_eq!(
            say(&ctx, &source, "dance now").await.text,
            "command \"dance now\" not found, use analytics help for a list of commands."
        );
        assert_eq!(say(&ctx, &source, "boosters").await.text, "Alpha has **2** boosters.");
        assert_eq!(
            say(&ctx, &source, "interval soon").await.text,
            render::INVALID_ARGUMENT
        );
    }

    #[tokio::test]
    async fn test_unknown_guild_reports_error() {
        let ctx = memory_context().await;
        let source = FakeSource::default();
        let reply = say(&ctx, &source, "snapshot").await;
        assert_eq!(reply.text, "error: Guild not found or not accessible: 1");
    }
}
