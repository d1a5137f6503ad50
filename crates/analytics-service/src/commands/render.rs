//! Chat text for command replies

use std::fmt::Write;

use analytics_core::analysis::{
    percent_change, DemographicRankings, MemberCountRun, RankedMember,
};
use analytics_core::{GrowthHorizons, GuildConfig, PeriodComparison, Snapshot, TableCounts, TrendResult};
use chrono::{DateTime, Utc};

use crate::services::{GrowthReport, StoreStats, SweepSummary};

pub(crate) const HELP: &str = "**server analytics commands**

• `analytics snapshot` (ss) - take a snapshot
• `analytics report` (rep) - generate detailed report
• `analytics clear` (clr) - clear data
• `analytics status` (stat) - show collection status
• `analytics members` (mem) - show recent member changes
• `analytics trend` (tr) - show growth trend analysis
• `analytics compare [days]` (cmp) - compare with previous period
• `analytics export` (exp) - export data to a csv file
• `analytics auto [on/off]` - manage automatic snapshots
• `analytics retention [days]` (ret) - set data retention period
• `analytics interval [hours]` (int) - set auto snapshot interval
• `analytics demographics` (demo) - show demographics summary
• `analytics demographics fetch [channel_id]` - fetch member demographics
• `analytics demographics list` - list tracked servers
• `analytics demographics remove <server_id>` - remove server from demographics tracking
• `analytics dbstats` - show database statistics
• `analytics holylogger` (holy) - snapshot and fetch members for all unmonitored servers
• `analytics boosters` - show the server booster count
• `analytics prune` - delete snapshots older than the retention period
• `analytics reset confirm` - wipe all analytics data";

pub(crate) const INVALID_ARGUMENT: &str =
    "invalid subcommand. use `analytics help` for a list of commands.";

pub(crate) const DEMOGRAPHICS_USAGE: &str =
    "usage: analytics demographics [fetch|list|remove <server_id>]";

pub(crate) const NO_CHANNEL: &str = "No accessible text channel found. Please specify a channel ID with `analytics demographics fetch <channel_id>`.";

pub(crate) const BAD_CHANNEL: &str =
    "Invalid or inaccessible channel ID. Please specify a valid text channel ID.";

pub(crate) const RESET_WARNING: &str = "⚠️ **DANGER ZONE: Database Reset** ⚠️

This will **DELETE ALL ANALYTICS DATA** (snapshots, demographics, configs) and cannot be undone.

To proceed, type:
`analytics reset confirm`

**Are you sure?**";

/// `1234567` as `1,234,567`
pub(crate) fn grouped(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Grouped with an explicit sign, `+0` for zero
pub(crate) fn signed(n: i64) -> String {
    if n < 0 {
        grouped(n)
    } else {
        format!("+{}", grouped(n))
    }
}

/// Whole hours keep one decimal (`20.0`), fractions print as given (`1.5`)
pub(crate) fn hours(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn short_stamp(at: DateTime<Utc>) -> String {
    at.format("%y-%m-%d %H:%M").to_string()
}

fn day(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn projection(value: Option<i64>) -> String {
    value.map(grouped).unwrap_or_else(|| "n/a".to_string())
}

pub(crate) fn snapshot(snap: &Snapshot) -> String {
    format!(
        "**new snapshot**\n\n**server**: {}\n**members**: {}\n**channels**: {}\n**time**: {} UTC",
        snap.guild_name,
        grouped(snap.member_count),
        grouped(snap.channel_count),
        snap.timestamp.format("%H:%M:%S"),
    )
}

pub(crate) fn report_unavailable(found: usize) -> String {
    format!(
        "Not enough data to generate a report. Found only {found} snapshot(s). \
         A minimum of 2 is required. Please use `analytics snapshot` to create more."
    )
}

pub(crate) fn report(guild_name: &str, report: &GrowthReport, boosters: i64) -> String {
    let latest = &report.latest;
    let peak_diff = latest.member_count - report.peak.member_count;
    let peak_diff = if peak_diff == 0 {
        "(0)".to_string()
    } else {
        format!("({})", signed(peak_diff))
    };
    let growth = latest.member_count - report.first.member_count;
    let growth_rate = percent_change(report.first.member_count, latest.member_count);
    let daily = report.trend.growth_rate_daily;
    let daily = if daily >= 0.0 {
        format!("+{daily:.1}")
    } else {
        format!("{daily:.1}")
    };
    let days_to_milestone = report
        .milestone
        .days_remaining
        .map(|d| d.to_string())
        .unwrap_or_else(|| "∞".to_string());

    format!(
        "**server analytics report: {guild_name}**

## server overview

**member statistics**
• total members: **{members}**
• peak members: **{peak}** {peak_diff}
• bots: **{bots}**
• human users: **{humans}**
• server boosters: **{boosters}**

**channel information**
• total channels: **{channels}**
• text channels: **{text}**
• voice channels: **{voice}**
• categories: **{categories}**

**role count**
• total roles: **{roles}**

**growth analysis**
• current trend: **{trend}**
• daily change: **{daily}** members/day
• member growth: **{growth}** members total
• growth rate: **{growth_rate:.2}%**
• next milestone: **{milestone}** members
• est. days to milestone: **{days_to_milestone}** days

*last updated: {updated}*",
        members = grouped(latest.member_count),
        peak = grouped(report.peak.member_count),
        bots = grouped(latest.bot_count),
        humans = grouped(latest.human_count()),
        channels = grouped(latest.channel_count),
        text = grouped(latest.text_channels),
        voice = grouped(latest.voice_channels),
        categories = grouped(latest.categories),
        roles = grouped(latest.role_count),
        trend = report.trend.trend.label(),
        growth = signed(growth),
        milestone = grouped(report.milestone.target),
        updated = short_stamp(latest.timestamp),
    )
}

pub(crate) fn status(guild_name: &str, config: &GuildConfig, total_snapshots: i64) -> String {
    let mut out = format!(
        "**analytics status for {guild_name}**\n\n\
         • total snapshots: {total_snapshots}\n\
         • data retention: {} days\n\
         • auto snapshot: {}\n\
         • snapshot interval: {} hours\n\
         • last auto snapshot: {}\n\
         • first snapshot: {}",
        config.snapshot_retention_days,
        if config.auto_snapshot { "enabled" } else { "disabled" },
        hours(config.auto_snapshot_interval_hours),
        config
            .last_auto_snapshot
            .map(short_stamp)
            .unwrap_or_else(|| "never".to_string()),
        config
            .first_snapshot_date
            .map(short_stamp)
            .unwrap_or_else(|| "unknown".to_string()),
    );
    if config.auto_snapshot {
        if let Some(next) = config.next_auto_snapshot() {
            let _ = write!(out, "\n• next auto snapshot: {}", short_stamp(next));
        }
    }
    out
}

pub(crate) fn auto_status(enabled: bool) -> String {
    format!(
        "**auto-snapshot status**\n\n\
         automatic daily snapshots are currently {}.\n\n\
         use `analytics auto on` to enable\n\
         use `analytics auto off` to disable",
        if enabled { "enabled" } else { "disabled" }
    )
}

/// Member history, newest run first
pub(crate) fn members(guild_name: &str, runs: &[MemberCountRun]) -> String {
    let Some(current) = runs.first() else {
        return "no analytics data available yet for this server.".to_string();
    };

    let mut out = format!("**member count history - {guild_name}**\n\n");
    let total: usize = runs.iter().map(|r| r.snapshots).sum();
    if total >= 2 {
        // change against the previous snapshot, which may sit in the same run
        let change = if current.snapshots > 1 {
            0
        } else {
            current.change.unwrap_or(0)
        };
        let _ = writeln!(
            out,
            "**current members:** {} ({})\n",
            grouped(current.member_count),
            signed(change)
        );
    } else {
        let _ = writeln!(out, "**current members:** {}\n", grouped(current.member_count));
    }

    for run in runs {
        let change = match run.change {
            Some(c) if c > 0 => format!(" (+{c})"),
            Some(c) if c < 0 => format!(" ({c})"),
            _ => String::new(),
        };
        if run.snapshots > 1 {
            let span = (run.newest - run.oldest).num_seconds() as f64 / 3600.0;
            let _ = writeln!(
                out,
                "**{}:** {} → {} ({span:.1}h)",
                run.newest.format("%b %d"),
                run.oldest.format("%I:%M %p"),
                run.newest.format("%I:%M %p"),
            );
        } else {
            let source = if run.any_auto { " (auto)" } else { "" };
            let _ = writeln!(out, "**{} UTC**{source}", run.newest.format("%Y-%m-%d %H:%M"));
        }
        let _ = writeln!(out, "members: **{}**{change}\n", grouped(run.member_count));
    }
    out.trim_end().to_string()
}

fn horizon(out: &mut String, title: &str, result: &TrendResult) {
    let _ = writeln!(out, "**{title}:** {}", result.trend.label());
    let _ = writeln!(out, "• daily change: **{:.1}** members/day", result.growth_rate_daily);
}

pub(crate) fn trend(current_members: i64, horizons: &GrowthHorizons, updated: DateTime<Utc>) -> String {
    let GrowthHorizons {
        short_term,
        medium_term,
        long_term,
    } = horizons;

    let mut out = format!(
        "## member growth analysis\n\n**current members:** {}\n\n",
        grouped(current_members)
    );
    horizon(&mut out, "short-term trend", short_term);
    let _ = writeln!(
        out,
        "• 7-day projection: **{}** members\n• confidence: {}\n",
        projection(short_term.prediction_7_days),
        short_term.confidence.as_str()
    );
    horizon(&mut out, "medium-term trend", medium_term);
    let _ = writeln!(
        out,
        "• 30-day projection: **{}** members\n• confidence: {}\n",
        projection(medium_term.prediction_30_days),
        medium_term.confidence.as_str()
    );
    let _ = writeln!(out, "**long-term trend:** {}", long_term.trend.label());
    let _ = writeln!(out, "• over {} days", long_term.days_measured);
    let _ = writeln!(out, "• total change: **{}** members\n", signed(long_term.growth_total));
    let _ = write!(
        out,
        "*note: projections are estimates based on current trends*\n*last updated: {}*",
        short_stamp(updated)
    );
    out
}

pub(crate) fn compare(c: &PeriodComparison) -> String {
    format!(
        "## server comparison

**time period:** {days:.1} days
**from:** {from}
**to:** {to}

**member changes**
• before: **{before}** members
• now: **{now}** members
• change: **{change}** members ({pct:+.2}%)
• bots: **{bots}**

**channel changes**
• total: **{channels}** channels
• text: **{text}**
• voice: **{voice}**

**role changes**
• total: **{roles}** roles",
        days = c.days_between,
        from = short_stamp(c.previous.timestamp),
        to = short_stamp(c.current.timestamp),
        before = grouped(c.previous.member_count),
        now = grouped(c.current.member_count),
        change = signed(c.member_change),
        pct = c.member_change_percent,
        bots = signed(c.bot_change),
        channels = signed(c.channel_change),
        text = signed(c.text_channel_change),
        voice = signed(c.voice_channel_change),
        roles = signed(c.role_change),
    )
}

fn ranked(members: &[RankedMember]) -> (String, String) {
    members
        .first()
        .map(|m| (m.name.clone(), day(Some(m.at))))
        .unwrap_or_else(|| ("nobody".to_string(), "unknown".to_string()))
}

pub(crate) fn demographics(rankings: &DemographicRankings) -> String {
    let (oldest, oldest_at) = ranked(&rankings.oldest_accounts);
    let (newest, newest_at) = ranked(&rankings.newest_accounts);
    let (longest, longest_at) = ranked(&rankings.longest_members);
    let (latest, latest_at) = ranked(&rankings.newest_members);

    format!(
        "## server demographics\n\n\
         **account creation**\n\
         • oldest tracked: {oldest} ({oldest_at})\n\
         • newest tracked: {newest} ({newest_at})\n\n\
         **server join**\n\
         • longest tracked: {longest} (joined {longest_at})\n\
         • newest tracked: {latest} (joined {latest_at})\n\n\
         *total tracked: {}*",
        rankings.total
    )
}

pub(crate) fn db_stats(stats: &StoreStats) -> String {
    let section = |title: &str, c: &TableCounts| {
        format!(
            "__{title}__\n• Snapshots: {}\n• Demographics: {}\n• Server Config: {}\n• Demographics Servers: {}",
            c.snapshots, c.demographics, c.server_configs, c.tracked_guilds
        )
    };
    format!(
        "**Database Statistics**\n\n{}\n\n{}",
        section("Current Guild", &stats.guild),
        section("Global", &stats.global)
    )
}

pub(crate) fn holylogger(summary: &SweepSummary) -> String {
    let targeted = summary.targeted();
    if targeted == 0 {
        return "All servers are already being monitored! No action needed.".to_string();
    }
    let failed = summary.failures.len();
    let status = if failed == 0 {
        "All servers now monitored!".to_string()
    } else {
        format!("{failed} servers failed to process")
    };

    format!(
        "**HOLYLOGGER COMPLETE**\n\n\
         **Results:**\n\
         • Total servers scanned: {}\n\
         • Unmonitored servers found: {targeted}\n\
         • Successfully processed: {}\n\
         • Failed to process: {failed}\n\
         • Total members fetched: {}\n\n\
         **Status:** {status}",
        summary.scanned,
        summary.processed,
        grouped(summary.members_fetched),
    )
}
