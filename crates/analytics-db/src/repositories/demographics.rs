//! SQLite implementation of DemographicsRepository

use analytics_core::traits::{
    CountWindow, DemographicsRepository, MemberSearch, RepoResult, SearchPage,
};
use analytics_core::{DemographicRecord, Snowflake};
use async_trait::async_trait;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::instrument;

use crate::mappers::DemographicParams;
use crate::models::DemographicModel;

use super::error::{guild_param, map_db_error, window_params};

/// SQLite implementation of DemographicsRepository
#[derive(Clone)]
pub struct SqliteDemographicsRepository {
    pool: SqlitePool,
}

impl SqliteDemographicsRepository {
    /// Create a new SqliteDemographicsRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert or overwrite one record on any executor (pool or transaction)
pub(crate) async fn upsert_record<'e, E>(executor: E, record: &DemographicRecord) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let params = DemographicParams::new(record);
    sqlx::query(
        r"
        INSERT INTO demographics (guild_id, member_id, name, account_created, joined_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (guild_id, member_id) DO UPDATE SET
            name = excluded.name,
            account_created = excluded.account_created,
            joined_at = excluded.joined_at
        ",
    )
    .bind(&params.guild_id)
    .bind(&params.member_id)
    .bind(params.name)
    .bind(&params.account_created)
    .bind(&params.joined_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Escape LIKE wildcards in user input
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl DemographicsRepository for SqliteDemographicsRepository {
    #[instrument(skip(self, record), fields(guild_id = %record.guild_id, member_id = %record.member_id))]
    async fn upsert(&self, record: &DemographicRecord) -> RepoResult<()> {
        upsert_record(&self.pool, record).await.map_err(map_db_error)
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert_many(&self, records: &[DemographicRecord]) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        for record in records {
            upsert_record(&mut *tx, record).await.map_err(map_db_error)?;
        }
        tx.commit().await.map_err(map_db_error)?;

        Ok(records.len() as u64)
    }

    #[instrument(skip(self))]
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<DemographicRecord>> {
        let models = sqlx::query_as::<_, DemographicModel>(
            r"
            SELECT guild_id, member_id, name, account_created, joined_at
            FROM demographics
            WHERE guild_id = $1
            ORDER BY name COLLATE NOCASE
            ",
        )
        .bind(guild_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(DemographicRecord::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, member_id: Snowflake) -> RepoResult<Vec<DemographicRecord>> {
        let models = sqlx::query_as::<_, DemographicModel>(
            r"
            SELECT guild_id, member_id, name, account_created, joined_at
            FROM demographics
            WHERE member_id = $1
            ORDER BY joined_at, guild_id
            ",
        )
        .bind(member_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(DemographicRecord::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count_members(&self, guild_id: Option<Snowflake>) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT member_id) FROM demographics WHERE ($1 IS NULL OR guild_id = $1)",
        )
        .bind(guild_param(guild_id))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn count_memberships(
        &self,
        guild_id: Option<Snowflake>,
        window: CountWindow,
    ) -> RepoResult<i64> {
        let (since, before) = window_params(window);
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM demographics
            WHERE ($1 IS NULL OR guild_id = $1)
              AND ($2 IS NULL OR joined_at >= $2)
              AND ($3 IS NULL OR joined_at < $3)
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
    async fn search(&self, search: &MemberSearch) -> RepoResult<SearchPage<DemographicRecord>> {
        let pattern = like_pattern(search.query.trim());
        let guild = guild_param(search.guild_id);

        let total = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM demographics
            WHERE name LIKE $1 ESCAPE '\' AND ($2 IS NULL OR guild_id = $2)
            ",
        )
        .bind(&pattern)
        .bind(&guild)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let models = sqlx::query_as::<_, DemographicModel>(
            r"
            SELECT guild_id, member_id, name, account_created, joined_at
            FROM demographics
            WHERE name LIKE $1 ESCAPE '\' AND ($2 IS NULL OR guild_id = $2)
            ORDER BY name COLLATE NOCASE, guild_id
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(&pattern)
        .bind(&guild)
        .bind(search.limit.max(0))
        .bind(search.offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let results = models
            .into_iter()
            .map(DemographicRecord::try_from)
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(SearchPage { results, total })
    }

    #[instrument(skip(self))]
    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM demographics WHERE guild_id = $1")
            .bind(guild_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
