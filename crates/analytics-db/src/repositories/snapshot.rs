//! SQLite implementation of SnapshotRepository

use analytics_core::traits::{CountWindow, RepoResult, SnapshotRepository};
use analytics_core::{format_timestamp, DomainError, Snapshot, Snowflake};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::instrument;

use crate::mappers::{parse_id, SnapshotParams};
use crate::models::{SnapshotModel, SNAPSHOT_COLUMNS};

use super::error::{guild_param, map_db_error, window_params};

/// SQLite implementation of SnapshotRepository
#[derive(Clone)]
pub struct SqliteSnapshotRepository {
    pool: SqlitePool,
}

impl SqliteSnapshotRepository {
    /// Create a new SqliteSnapshotRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn into_entities(models: Vec<SnapshotModel>) -> RepoResult<Vec<Snapshot>> {
        models.into_iter().map(Snapshot::try_from).collect()
    }
}

/// Append one snapshot on any executor (pool or transaction)
pub(crate) async fn insert_snapshot<'e, E>(executor: E, snapshot: &Snapshot) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let params = SnapshotParams::new(snapshot);
    let result = sqlx::query(
        r"
        INSERT INTO snapshots (
            guild_id, guild_name, timestamp, member_count, channel_count, text_channels,
            voice_channels, categories, role_count, bots, boosters, is_auto
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ",
    )
    .bind(&params.guild_id)
    .bind(params.guild_name)
    .bind(&params.timestamp)
    .bind(params.member_count)
    .bind(params.channel_count)
    .bind(params.text_channels)
    .bind(params.voice_channels)
    .bind(params.categories)
    .bind(params.role_count)
    .bind(params.bots)
    .bind(params.boosters)
    .bind(params.is_auto)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

#[async_trait]
impl SnapshotRepository for SqliteSnapshotRepository {
    #[instrument(skip(self, snapshot), fields(guild_id = %snapshot.guild_id))]
    async fn insert(&self, snapshot: &Snapshot) -> RepoResult<i64> {
        insert_snapshot(&self.pool, snapshot).await.map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Snapshot>> {
        let sql = format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE guild_id = $1 ORDER BY timestamp ASC, id ASC"
        );
        let models = sqlx::query_as::<_, SnapshotModel>(&sql)
            .bind(guild_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Self::into_entities(models)
    }

    #[instrument(skip(self))]
    async fn find_since(
        &self,
        guild_id: Option<Snowflake>,
        since: DateTime<Utc>,
    ) -> RepoResult<Vec<Snapshot>> {
        let sql = format!(
            r"
            SELECT {SNAPSHOT_COLUMNS} FROM snapshots
            WHERE ($1 IS NULL OR guild_id = $1) AND timestamp >= $2
            ORDER BY timestamp ASC, id ASC
            "
        );
        let models = sqlx::query_as::<_, SnapshotModel>(&sql)
            .bind(guild_param(guild_id))
            .bind(format_timestamp(since))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Self::into_entities(models)
    }

    #[instrument(skip(self))]
    async fn latest(&self, guild_id: Snowflake) -> RepoResult<Option<Snapshot>> {
        let sql = format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE guild_id = $1 ORDER BY timestamp DESC, id DESC LIMIT 1"
        );
        let model = sqlx::query_as::<_, SnapshotModel>(&sql)
            .bind(guild_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        model.map(Snapshot::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn count(&self, guild_id: Option<Snowflake>, window: CountWindow) -> RepoResult<i64> {
        let (since, before) = window_params(window);
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM snapshots
            WHERE ($1 IS NULL OR guild_id = $1)
              AND ($2 IS NULL OR timestamp >= $2)
              AND ($3 IS NULL OR timestamp < $3)
            ",
        )
        .bind(guild_param(guild_id))
        .bind(since)
        .bind(before)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn count_guilds(&self, window: CountWindow) -> RepoResult<i64> {
        let (since, before) = window_params(window);
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(DISTINCT guild_id) FROM snapshots
            WHERE ($1 IS NULL OR timestamp >= $1)
              AND ($2 IS NULL OR timestamp < $2)
            ",
        )
        .bind(since)
        .bind(before)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn guild_ids(&self) -> RepoResult<Vec<Snowflake>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT guild_id FROM snapshots ORDER BY guild_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        ids.iter().map(|id| parse_id(id, "snapshots.guild_id")).collect()
    }

    #[instrument(skip(self))]
    async fn latest_names(&self) -> RepoResult<Vec<(Snowflake, String)>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r"
            SELECT s.guild_id, COALESCE(s.guild_name, '') AS guild_name
            FROM snapshots s
            WHERE s.id = (
                SELECT latest.id FROM snapshots latest
                WHERE latest.guild_id = s.guild_id
                ORDER BY latest.timestamp DESC, latest.id DESC
                LIMIT 1
            )
            ORDER BY guild_name COLLATE NOCASE
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter()
            .map(|(id, name)| Ok((parse_id(&id, "snapshots.guild_id")?, name)))
            .collect::<Result<_, DomainError>>()
    }

    #[instrument(skip(self))]
    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM snapshots WHERE guild_id = $1")
            .bind(guild_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_older_than(&self, guild_id: Snowflake, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM snapshots WHERE guild_id = $1 AND timestamp < $2")
            .bind(guild_id.to_string())
            .bind(format_timestamp(cutoff))
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
