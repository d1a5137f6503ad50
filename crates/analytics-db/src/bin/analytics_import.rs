//! Import the legacy per-guild JSON store into the analytics database
//!
//! ```bash
//! cargo run -p analytics-db --bin analytics-import -- \
//!     --source ./json/analytics --servers-file ./json/demographics_servers.json
//! ```

use std::path::PathBuf;

use analytics_common::try_init_tracing;
use analytics_core::ConfigRepository;
use analytics_db::{create_pool, DatabaseConfig, LegacyImporter, SqliteConfigRepository};
use anyhow::Context;
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "analytics-import", about = "Import legacy analytics JSON files into SQLite")]
struct Args {
    /// Directory holding one sub-directory per guild id
    #[arg(long)]
    source: PathBuf,

    /// JSON array of guild ids tracked for demographics
    #[arg(long)]
    servers_file: Option<PathBuf>,

    /// Database URL (defaults to DATABASE_URL, then sqlite://analytics.db?mode=rwc)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let args = Args::parse();
    let mut config = DatabaseConfig::default();
    if let Some(url) = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
    {
        config.url = url;
    }

    let pool = create_pool(&config)
        .await
        .with_context(|| format!("opening {}", config.url))?;

    let report = LegacyImporter::new(pool.clone())
        .import_dir(&args.source, args.servers_file.as_deref())
        .await?;
    let backfilled = SqliteConfigRepository::new(pool)
        .backfill_from_snapshots()
        .await?;

    for guild in &report.guilds {
        println!(
            "{}: {}/{} snapshots imported, {} skipped, {} duplicate, {} members, config {}{}",
            guild.guild_id,
            guild.snapshots_imported,
            guild.snapshots_total,
            guild.snapshots_skipped,
            guild.snapshots_duplicate,
            guild.demographics_imported,
            if guild.config_imported { "yes" } else { "no" },
            if guild.rolled_back { " (rolled back)" } else { "" },
        );
        for error in &guild.errors {
            println!("    {error}");
        }
    }
    for ignored in &report.ignored {
        println!("ignored: {ignored}");
    }

    info!(
        guilds = report.guilds.len(),
        snapshots = report.snapshots_imported(),
        tracked = report.tracked_imported,
        backfilled,
        errors = report.error_count(),
        "Import finished"
    );

    Ok(())
}
