//! Snapshot collector
//!
//! Captures guild statistics into the snapshot log, keeps per-guild bookkeeping current
//! and runs the automatic snapshot schedule.

use analytics_core::{GuildConfig, GuildState, Snapshot, Snowflake};
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// What an automatic snapshot attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSnapshotOutcome {
    Taken(Snapshot),
    /// Auto snapshots are off (or never configured) for the guild
    Disabled,
    /// The interval has not elapsed, or another caller claimed the slot first
    NotDue,
    /// The activity sample did not select this event
    SampledOut,
}

impl AutoSnapshotOutcome {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Taken(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Collector service
pub struct CollectorService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CollectorService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a snapshot of the guild's current state
    pub async fn capture(&self, state: &GuildState, is_auto: bool) -> ServiceResult<Snapshot> {
        self.capture_at(state, Utc::now(), is_auto).await
    }

    #[instrument(skip(self, state), fields(guild_id = %state.id))]
    pub async fn capture_at(
        &self,
        state: &GuildState,
        at: DateTime<Utc>,
        is_auto: bool,
    ) -> ServiceResult<Snapshot> {
        let mut snapshot = Snapshot::capture(state, at, is_auto);
        let id = self.ctx.snapshot_repo().insert(&snapshot).await?;
        snapshot.id = Some(id);

        self.ctx.config_repo().record_capture(state.id, at, is_auto).await?;
        self.ctx.tracked_repo().add(state.id).await?;

        info!(
            guild_id = %state.id,
            member_count = snapshot.member_count,
            is_auto,
            "Snapshot captured"
        );
        Ok(snapshot)
    }

    /// Whether an automatic snapshot is due now. Does not check `auto_snapshot`.
    #[instrument(skip(self))]
    pub async fn should_auto_snapshot(&self, guild_id: Snowflake) -> ServiceResult<bool> {
        let config = self
            .ctx
            .config_repo()
            .find(guild_id)
            .await?
            .unwrap_or_else(|| GuildConfig::new(guild_id));
        Ok(config.should_auto_snapshot(Utc::now()))
    }

    pub async fn auto_snapshot(&self, state: &GuildState) -> ServiceResult<AutoSnapshotOutcome> {
        self.auto_snapshot_at(state, Utc::now()).await
    }

    /// Take an automatic snapshot if enabled and due.
    ///
    /// Eligibility is settled by a compare-and-swap on `last_auto_snapshot`, so of two
    /// concurrent callers at most one captures.
    #[instrument(skip(self, state), fields(guild_id = %state.id))]
    pub async fn auto_snapshot_at(
        &self,
        state: &GuildState,
        now: DateTime<Utc>,
    ) -> ServiceResult<AutoSnapshotOutcome> {
        let Some(config) = self.ctx.config_repo().find(state.id).await? else {
            return Ok(AutoSnapshotOutcome::Disabled);
        };
        if !config.auto_snapshot {
            return Ok(AutoSnapshotOutcome::Disabled);
        }
        if !config.should_auto_snapshot(now) {
            return Ok(AutoSnapshotOutcome::NotDue);
        }

        let claimed = self
            .ctx
            .config_repo()
            .claim_auto_snapshot(state.id, config.last_auto_snapshot, now)
            .await?;
        if !claimed {
            debug!(guild_id = %state.id, "Auto snapshot slot taken by another caller");
            return Ok(AutoSnapshotOutcome::NotDue);
        }

        let snapshot = self.capture_at(state, now, true).await?;

        if let Some(notifier) = self.ctx.notifier() {
            if let Err(e) = notifier.snapshot_taken(&snapshot).await {
                warn!(guild_id = %state.id, error = %e, "Auto snapshot notification failed");
            }
        }

        Ok(AutoSnapshotOutcome::Taken(snapshot))
    }

    /// Auto snapshot check driven by unrelated guild activity, sampled at
    /// `collector.auto_sample_rate`
    pub async fn maybe_auto_snapshot(
        &self,
        state: &GuildState,
    ) -> ServiceResult<AutoSnapshotOutcome> {
        let selected = rand::thread_rng().gen::<f64>() < self.ctx.collector().auto_sample_rate;
        if !selected {
            return Ok(AutoSnapshotOutcome::SampledOut);
        }
        self.auto_snapshot(state).await
    }
}
