//! SQLite implementation of MaintenanceRepository

use analytics_core::traits::{MaintenanceRepository, RepoResult, TableCounts};
use analytics_core::Snowflake;
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{instrument, warn};

use super::error::{guild_param, map_db_error};

const TABLES: [&str; 4] = ["snapshots", "demographics", "server_config", "demographics_servers"];

/// Store-wide statistics and reset
#[derive(Clone)]
pub struct SqliteMaintenanceRepository {
    pool: SqlitePool,
}

impl SqliteMaintenanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn count_rows(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    guild: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE ($1 IS NULL OR guild_id = $1)");
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(guild)
        .fetch_one(&mut **tx)
        .await
}

async fn table_counts(
    tx: &mut Transaction<'_, Sqlite>,
    guild: Option<&str>,
) -> Result<TableCounts, sqlx::Error> {
    Ok(TableCounts {
        snapshots: count_rows(tx, TABLES[0], guild).await?,
        demographics: count_rows(tx, TABLES[1], guild).await?,
        server_configs: count_rows(tx, TABLES[2], guild).await?,
        tracked_guilds: count_rows(tx, TABLES[3], guild).await?,
    })
}

#[async_trait]
impl MaintenanceRepository for SqliteMaintenanceRepository {
    #[instrument(skip(self))]
    async fn table_counts(&self, guild_id: Option<Snowflake>) -> RepoResult<TableCounts> {
        let guild = guild_param(guild_id);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let counts = table_counts(&mut tx, guild.as_deref())
            .await
            .map_err(map_db_error)?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(counts)
    }

    #[instrument(skip(self))]
    async fn reset(&self) -> RepoResult<TableCounts> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let removed = table_counts(&mut tx, None).await.map_err(map_db_error)?;

        for table in TABLES {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }
        tx.commit().await.map_err(map_db_error)?;

        warn!(
            snapshots = removed.snapshots,
            demographics = removed.demographics,
            "Analytics store reset"
        );
        Ok(removed)
    }
}
