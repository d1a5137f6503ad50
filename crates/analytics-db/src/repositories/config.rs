//! SQLite implementation of ConfigRepository

use analytics_core::traits::{ConfigRepository, RepoResult};
use analytics_core::{format_timestamp, parse_timestamp, GuildConfig, Snowflake};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, instrument};

use crate::mappers::ConfigParams;
use crate::models::ServerConfigModel;

use super::error::map_db_error;

/// SQLite implementation of ConfigRepository
#[derive(Clone)]
pub struct SqliteConfigRepository {
    pool: SqlitePool,
}

impl SqliteConfigRepository {
    /// Create a new SqliteConfigRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert or replace a full config row on any executor
pub(crate) async fn save_config<'e, E>(executor: E, config: &GuildConfig) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let params = ConfigParams::new(config);
    sqlx::query(
        r"
        INSERT OR REPLACE INTO server_config (
            guild_id, auto_snapshot, last_auto_snapshot, first_snapshot_date,
            chart_style, snapshot_retention_days, auto_snapshot_interval_hours
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ",
    )
    .bind(&params.guild_id)
    .bind(params.auto_snapshot)
    .bind(&params.last_auto_snapshot)
    .bind(&params.first_snapshot_date)
    .bind(params.chart_style)
    .bind(params.snapshot_retention_days)
    .bind(params.auto_snapshot_interval_hours)
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl ConfigRepository for SqliteConfigRepository {
    #[instrument(skip(self))]
    async fn find(&self, guild_id: Snowflake) -> RepoResult<Option<GuildConfig>> {
        let model = sqlx::query_as::<_, ServerConfigModel>(
            r"
            SELECT guild_id, auto_snapshot, last_auto_snapshot, first_snapshot_date,
                   chart_style, snapshot_retention_days, auto_snapshot_interval_hours
            FROM server_config
            WHERE guild_id = $1
            ",
        )
        .bind(guild_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        model.map(GuildConfig::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<GuildConfig>> {
        let models = sqlx::query_as::<_, ServerConfigModel>(
            r"
            SELECT guild_id, auto_snapshot, last_auto_snapshot, first_snapshot_date,
                   chart_style, snapshot_retention_days, auto_snapshot_interval_hours
            FROM server_config
            ORDER BY guild_id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(GuildConfig::try_from).collect()
    }

    #[instrument(skip(self, config), fields(guild_id = %config.guild_id))]
    async fn save(&self, config: &GuildConfig) -> RepoResult<()> {
        save_config(&self.pool, config).await.map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn record_capture(
        &self,
        guild_id: Snowflake,
        at: DateTime<Utc>,
        is_auto: bool,
    ) -> RepoResult<()> {
        let at = format_timestamp(at);
        let last_auto = is_auto.then(|| at.clone());

        sqlx::query(
            r"
            INSERT INTO server_config (
                guild_id, auto_snapshot, last_auto_snapshot, first_snapshot_date,
                chart_style, snapshot_retention_days, auto_snapshot_interval_hours
            )
            VALUES ($1, 0, $2, $3, $4, $5, $6)
            ON CONFLICT (guild_id) DO UPDATE SET
                last_auto_snapshot = COALESCE(excluded.last_auto_snapshot, server_config.last_auto_snapshot),
                first_snapshot_date = COALESCE(server_config.first_snapshot_date, excluded.first_snapshot_date)
            ",
        )
        .bind(guild_id.to_string())
        .bind(last_auto)
        .bind(&at)
        .bind(GuildConfig::DEFAULT_CHART_STYLE)
        .bind(GuildConfig::DEFAULT_RETENTION_DAYS)
        .bind(GuildConfig::DEFAULT_INTERVAL_HOURS)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn claim_auto_snapshot(
        &self,
        guild_id: Snowflake,
        observed: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        // Compare against the stored text so legacy formats can still be claimed
        let stored = sqlx::query_scalar::<_, Option<String>>(
            "SELECT last_auto_snapshot FROM server_config WHERE guild_id = $1 AND auto_snapshot = 1",
        )
        .bind(guild_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(stored) = stored else {
            return Ok(false);
        };
        if stored.as_deref().and_then(parse_timestamp) != observed {
            debug!("Auto-snapshot slot already moved");
            return Ok(false);
        }

        let result = sqlx::query(
            r"
            UPDATE server_config
            SET last_auto_snapshot = $1
            WHERE guild_id = $2 AND auto_snapshot = 1 AND last_auto_snapshot IS $3
            ",
        )
        .bind(format_timestamp(at))
        .bind(guild_id.to_string())
        .bind(stored)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn backfill_from_snapshots(&self) -> RepoResult<u64> {
        let created = sqlx::query(
            r"
            INSERT OR IGNORE INTO server_config (
                guild_id, auto_snapshot, last_auto_snapshot, first_snapshot_date,
                chart_style, snapshot_retention_days, auto_snapshot_interval_hours
            )
            SELECT guild_id, 0, NULL, MIN(timestamp), $1, $2, $3
            FROM snapshots
            GROUP BY guild_id
            ",
        )
        .bind(GuildConfig::DEFAULT_CHART_STYLE)
        .bind(GuildConfig::DEFAULT_RETENTION_DAYS)
        .bind(GuildConfig::DEFAULT_INTERVAL_HOURS)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        let filled = sqlx::query(
            r"
            UPDATE server_config
            SET first_snapshot_date = (
                SELECT MIN(s.timestamp) FROM snapshots s WHERE s.guild_id = server_config.guild_id
            )
            WHERE first_snapshot_date IS NULL
              AND EXISTS (SELECT 1 FROM snapshots s WHERE s.guild_id = server_config.guild_id)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(created.rows_affected() + filled.rows_affected())
    }
}
