//! SQLite connection pool management and schema bootstrap

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

/// Database configuration for connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://analytics.db?mode=rwc`
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Maximum time to wait for a connection
    pub acquire_timeout: Duration,
    /// How long a writer waits on a locked database
    pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from("sqlite://analytics.db?mode=rwc"),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&analytics_common::DatabaseConfig> for DatabaseConfig {
    fn from(config: &analytics_common::DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections.max(1),
            ..Default::default()
        }
    }
}

const SCHEMA: [&str; 6] = [
    r"
    CREATE TABLE IF NOT EXISTS snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        guild_id TEXT NOT NULL,
        guild_name TEXT,
        timestamp TEXT NOT NULL,
        member_count INTEGER,
        channel_count INTEGER,
        text_channels INTEGER,
        voice_channels INTEGER,
        categories INTEGER,
        role_count INTEGER,
        bots INTEGER,
        boosters INTEGER,
        is_auto INTEGER DEFAULT 0
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_snapshots_guild_timestamp
    ON snapshots (guild_id, timestamp)
    ",
    r"
    CREATE TABLE IF NOT EXISTS demographics (
        guild_id TEXT NOT NULL,
        member_id TEXT NOT NULL,
        name TEXT,
        account_created TEXT,
        joined_at TEXT,
        PRIMARY KEY (guild_id, member_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS server_config (
        guild_id TEXT PRIMARY KEY,
        auto_snapshot INTEGER,
        last_auto_snapshot TEXT,
        first_snapshot_date TEXT,
        chart_style TEXT,
        snapshot_retention_days INTEGER,
        auto_snapshot_interval_hours REAL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS demographics_servers (
        guild_id TEXT PRIMARY KEY
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_demographics_name
    ON demographics (name)
    ",
];

/// Create a new SQLite connection pool and make sure the schema exists
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .busy_timeout(config.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await?;

    ensure_schema(&pool).await?;
    info!(url = %config.url, "Database ready");
    Ok(pool)
}

/// Create a private in-memory database with the full schema.
///
/// Uses a single connection that is never recycled; closing it drops the data.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

/// Create missing tables and repair older database files
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    // Files written before booster tracking lack the column
    let columns: Vec<String> =
        sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info('snapshots')")
            .fetch_all(pool)
            .await?;
    if !columns.iter().any(|c| c == "boosters") {
        sqlx::query("ALTER TABLE snapshots ADD COLUMN boosters INTEGER")
            .execute(pool)
            .await?;
        info!("Added boosters column to snapshots");
    }

    Ok(())
}
