//! Member demographics collection
//!
//! Enumerates guild members through a [`GuildSource`] and keeps one record per
//! (guild, member).

use analytics_core::analysis::DemographicRankings;
use analytics_core::{
    rank_demographics, CountWindow, DemographicRecord, DomainError, GuildSource, MemberInfo,
    Snowflake,
};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Result of a member fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub guild_id: Snowflake,
    pub guild_name: String,
    pub members_fetched: i64,
    /// Channel the fetch ran against
    pub channel_id: Snowflake,
    /// Records stored for the guild afterwards
    pub total_tracked: i64,
}

/// Demographics service
pub struct DemographicsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DemographicsService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fetch every member of a guild and upsert their records.
    ///
    /// A channel hint must name a readable text channel. Without one, readable text
    /// channels are tried in order until a fetch succeeds.
    #[instrument(skip(self, source))]
    pub async fn fetch(
        &self,
        source: &dyn GuildSource,
        guild_id: Snowflake,
        channel_hint: Option<Snowflake>,
    ) -> ServiceResult<FetchOutcome> {
        let state = source
            .guild(guild_id)
            .await?
            .ok_or(DomainError::GuildNotFound(guild_id))?;

        let (channel_id, members) = match channel_hint {
            Some(hint) => {
                let channel = state
                    .channel(hint)
                    .filter(|c| c.is_readable_text())
                    .ok_or(DomainError::UnusableChannel(hint))?;
                (channel.id, source.fetch_members(guild_id, channel.id).await?)
            }
            None => {
                let candidates: Vec<Snowflake> =
                    state.readable_text_channels().map(|c| c.id).collect();
                self.fetch_any_channel(source, guild_id, &candidates).await?
            }
        };

        let records: Vec<DemographicRecord> = members
            .iter()
            .map(|m| DemographicRecord::from_member(guild_id, m))
            .collect();
        self.ctx.demographics_repo().upsert_many(&records).await?;
        self.ctx.tracked_repo().add(guild_id).await?;

        let total_tracked = self
            .ctx
            .demographics_repo()
            .count_memberships(Some(guild_id), CountWindow::All)
            .await?;

        info!(
            guild_id = %guild_id,
            channel_id = %channel_id,
            fetched = records.len(),
            "Demographics updated"
        );

        Ok(FetchOutcome {
            guild_id,
            guild_name: state.name,
            members_fetched: records.len() as i64,
            channel_id,
            total_tracked,
        })
    }

    async fn fetch_any_channel(
        &self,
        source: &dyn GuildSource,
        guild_id: Snowflake,
        channels: &[Snowflake],
    ) -> ServiceResult<(Snowflake, Vec<MemberInfo>)> {
        for &channel_id in channels {
            match source.fetch_members(guild_id, channel_id).await {
                Ok(members) => return Ok((channel_id, members)),
                Err(e) => {
                    warn!(
                        guild_id = %guild_id,
                        channel_id = %channel_id,
                        error = %e,
                        "Member fetch failed, trying next channel"
                    );
                }
            }
        }
        Err(DomainError::NoReadableChannel(guild_id).into())
    }

    /// Rankings over the stored records of one guild
    #[instrument(skip(self))]
    pub async fn summary(&self, guild_id: Snowflake) -> ServiceResult<DemographicRankings> {
        let records = self.ctx.demographics_repo().find_by_guild(guild_id).await?;
        Ok(rank_demographics(&records))
    }

    #[instrument(skip(self))]
    pub async fn list_tracked(&self) -> ServiceResult<Vec<Snowflake>> {
        Ok(self.ctx.tracked_repo().list().await?)
    }

    /// Stop tracking a guild; stored records are kept
    #[instrument(skip(self))]
    pub async fn remove_tracked(&self, guild_id: Snowflake) -> ServiceResult<bool> {
        let removed = self.ctx.tracked_repo().remove(guild_id).await?;
        if removed {
            info!(guild_id = %guild_id, "Guild removed from demographics tracking");
        }
        Ok(removed)
    }
}
