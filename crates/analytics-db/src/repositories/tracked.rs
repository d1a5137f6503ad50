//! SQLite implementation of TrackedGuildRepository

use analytics_core::traits::{RepoResult, TrackedGuildRepository};
use analytics_core::Snowflake;
use async_trait::async_trait;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::instrument;

use crate::mappers::parse_id;

use super::error::map_db_error;

/// Guilds opted into demographics collection (`demographics_servers`)
#[derive(Clone)]
pub struct SqliteTrackedGuildRepository {
    pool: SqlitePool,
}

impl SqliteTrackedGuildRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Add a guild to the tracked set on any executor; true when newly added
pub(crate) async fn track_guild<'e, E>(executor: E, guild_id: Snowflake) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("INSERT OR IGNORE INTO demographics_servers (guild_id) VALUES ($1)")
        .bind(guild_id.to_string())
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}

#[async_trait]
impl TrackedGuildRepository for SqliteTrackedGuildRepository {
    #[instrument(skip(self))]
    async fn add(&self, guild_id: Snowflake) -> RepoResult<bool> {
        track_guild(&self.pool, guild_id).await.map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn remove(&self, guild_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM demographics_servers WHERE guild_id = $1")
            .bind(guild_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn contains(&self, guild_id: Snowflake) -> RepoResult<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS (SELECT 1 FROM demographics_servers WHERE guild_id = $1)",
        )
        .bind(guild_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(found != 0)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<Snowflake>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT guild_id FROM demographics_servers ORDER BY guild_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        ids.iter()
            .map(|id| parse_id(id, "demographics_servers.guild_id"))
            .collect()
    }
}
