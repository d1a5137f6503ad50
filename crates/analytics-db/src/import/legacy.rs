//! Legacy JSON importer

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use analytics_core::{
    format_timestamp, parse_timestamp, DemographicRecord, GuildConfig, Snapshot, Snowflake,
};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{info, instrument, warn};

use crate::repositories::{insert_snapshot, save_config, track_guild, upsert_record};

const SNAPSHOTS_FILE: &str = "member_snapshots.json";
const DEMOGRAPHICS_FILE: &str = "member_demographics.json";
const CONFIG_FILE: &str = "analytics_config.json";

/// Importer errors that abort the whole run
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tracked-servers file {path}: {source}")]
    ServersFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome for one guild directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct GuildImportStats {
    pub guild_id: String,
    pub snapshots_total: usize,
    pub snapshots_imported: usize,
    pub snapshots_skipped: usize,
    /// Same guild and timestamp already stored
    pub snapshots_duplicate: usize,
    pub demographics_imported: usize,
    pub demographics_skipped: usize,
    pub config_imported: bool,
    /// The guild's transaction was rolled back
    pub rolled_back: bool,
    pub errors: Vec<String>,
}

/// Outcome of a full import run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub guilds: Vec<GuildImportStats>,
    /// Directory entries that are not guild ids
    pub ignored: Vec<String>,
    pub tracked_imported: usize,
}

impl ImportReport {
    pub fn snapshots_imported(&self) -> usize {
        self.guilds.iter().map(|g| g.snapshots_imported).sum()
    }

    pub fn error_count(&self) -> usize {
        self.guilds.iter().map(|g| g.errors.len()).sum()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    snapshots: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct LegacySnapshot {
    name: Option<String>,
    timestamp: String,
    member_count: Option<i64>,
    channel_count: Option<i64>,
    text_channels: Option<i64>,
    voice_channels: Option<i64>,
    categories: Option<i64>,
    role_count: Option<i64>,
    bots: Option<i64>,
    boosters: Option<i64>,
    #[serde(default)]
    is_auto: bool,
}

#[derive(Debug, Deserialize)]
struct LegacyMember {
    name: Option<String>,
    account_created: Option<String>,
    joined_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyConfig {
    auto_snapshot: Option<bool>,
    last_auto_snapshot: Option<String>,
    first_snapshot_date: Option<String>,
    chart_style: Option<String>,
    snapshot_retention_days: Option<i64>,
    auto_snapshot_interval_hours: Option<f64>,
}

impl LegacySnapshot {
    fn into_snapshot(self, guild_id: Snowflake) -> Result<Snapshot, String> {
        let timestamp = parse_timestamp(&self.timestamp)
            .ok_or_else(|| format!("unparseable timestamp '{}'", self.timestamp))?;
        let member_count = self.member_count.ok_or("missing member_count")?;
        if member_count < 0 {
            return Err(format!("negative member_count {member_count}"));
        }

        Ok(Snapshot {
            id: None,
            guild_id,
            guild_name: self.name.unwrap_or_default(),
            timestamp,
            member_count,
            channel_count: self.channel_count.unwrap_or(0),
            text_channels: self.text_channels.unwrap_or(0),
            voice_channels: self.voice_channels.unwrap_or(0),
            categories: self.categories.unwrap_or(0),
            role_count: self.role_count.unwrap_or(0),
            bot_count: self.bots.unwrap_or(0),
            booster_count: self.boosters.unwrap_or(0),
            is_auto: self.is_auto,
        })
    }
}

impl LegacyConfig {
    fn into_config(self, guild_id: Snowflake) -> GuildConfig {
        let defaults = GuildConfig::new(guild_id);
        GuildConfig {
            auto_snapshot: self.auto_snapshot.unwrap_or(false),
            last_auto_snapshot: self.last_auto_snapshot.as_deref().and_then(parse_timestamp),
            first_snapshot_date: self.first_snapshot_date.as_deref().and_then(parse_timestamp),
            chart_style: self.chart_style.unwrap_or(defaults.chart_style.clone()),
            snapshot_retention_days: self
                .snapshot_retention_days
                .filter(|d| *d > 0)
                .unwrap_or(defaults.snapshot_retention_days),
            auto_snapshot_interval_hours: self
                .auto_snapshot_interval_hours
                .filter(|h| *h > 0.0)
                .unwrap_or(defaults.auto_snapshot_interval_hours),
            ..defaults
        }
    }
}

/// Reads the legacy JSON layout into the SQLite store
pub struct LegacyImporter {
    pool: SqlitePool,
}

impl LegacyImporter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Import every guild directory under `source`, then the tracked-servers list.
    ///
    /// Each guild is imported in its own transaction. Malformed records are skipped and
    /// reported; a database failure rolls back only that guild.
    #[instrument(skip(self))]
    pub async fn import_dir(
        &self,
        source: &Path,
        servers_file: Option<&Path>,
    ) -> Result<ImportReport, ImportError> {
        let mut report = ImportReport::default();

        let entries = fs::read_dir(source).map_err(|source_err| ImportError::Io {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        let mut dirs: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Ok(guild_id) = Snowflake::parse(&name) else {
                report.ignored.push(name);
                continue;
            };

            let stats = self.import_guild(guild_id, &dir).await;
            info!(
                guild_id = %guild_id,
                imported = stats.snapshots_imported,
                skipped = stats.snapshots_skipped,
                members = stats.demographics_imported,
                rolled_back = stats.rolled_back,
                "Guild imported"
            );
            report.guilds.push(stats);
        }

        if let Some(path) = servers_file {
            report.tracked_imported = self.import_tracked(path).await?;
        }

        Ok(report)
    }

    async fn import_guild(&self, guild_id: Snowflake, dir: &Path) -> GuildImportStats {
        let mut stats = GuildImportStats {
            guild_id: guild_id.to_string(),
            ..Default::default()
        };

        let result = async {
            let mut tx = self.pool.begin().await?;
            import_snapshots(&mut tx, guild_id, dir, &mut stats).await?;
            import_demographics(&mut tx, guild_id, dir, &mut stats).await?;
            import_config(&mut tx, guild_id, dir, &mut stats).await?;
            tx.commit().await
        }
        .await;

        if let Err(e) = result {
            warn!(guild_id = %guild_id, error = %e, "Guild import rolled back");
            stats.errors.push(format!("transaction rolled back: {e}"));
            stats.rolled_back = true;
            stats.snapshots_imported = 0;
            stats.demographics_imported = 0;
            stats.config_imported = false;
        }

        stats
    }

    async fn import_tracked(&self, path: &Path) -> Result<usize, ImportError> {
        let raw = fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ids: Vec<Snowflake> =
            serde_json::from_str(&raw).map_err(|source| ImportError::ServersFile {
                path: path.to_path_buf(),
                source,
            })?;

        let mut tx = self.pool.begin().await?;
        let mut added = 0;
        for id in ids {
            if track_guild(&mut *tx, id).await? {
                added += 1;
            }
        }
        tx.commit().await?;

        Ok(added)
    }
}

/// Read a JSON file if present. Parse failures are recorded and treated as absent.
fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    stats: &mut GuildImportStats,
) -> Option<T> {
    if !path.is_file() {
        return None;
    }
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()));
    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            stats.errors.push(format!("could not parse {}: {e}", path.display()));
            None
        }
    }
}

async fn import_snapshots(
    tx: &mut Transaction<'_, Sqlite>,
    guild_id: Snowflake,
    dir: &Path,
    stats: &mut GuildImportStats,
) -> Result<(), sqlx::Error> {
    let Some(file) = read_json::<SnapshotFile>(&dir.join(SNAPSHOTS_FILE), stats) else {
        return Ok(());
    };
    stats.snapshots_total = file.snapshots.len();

    for (index, value) in file.snapshots.into_iter().enumerate() {
        let snapshot = serde_json::from_value::<LegacySnapshot>(value)
            .map_err(|e| e.to_string())
            .and_then(|legacy| legacy.into_snapshot(guild_id));
        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(e) => {
                stats.snapshots_skipped += 1;
                stats
                    .errors
                    .push(format!("snapshot #{}: {e}", index + 1));
                continue;
            }
        };

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS (SELECT 1 FROM snapshots WHERE guild_id = $1 AND timestamp = $2)",
        )
        .bind(guild_id.to_string())
        .bind(format_timestamp(snapshot.timestamp))
        .fetch_one(&mut **tx)
        .await?;
        if exists != 0 {
            stats.snapshots_duplicate += 1;
            continue;
        }

        insert_snapshot(&mut **tx, &snapshot).await?;
        stats.snapshots_imported += 1;
    }

    Ok(())
}

async fn import_demographics(
    tx: &mut Transaction<'_, Sqlite>,
    guild_id: Snowflake,
    dir: &Path,
    stats: &mut GuildImportStats,
) -> Result<(), sqlx::Error> {
    let Some(members) =
        read_json::<BTreeMap<String, serde_json::Value>>(&dir.join(DEMOGRAPHICS_FILE), stats)
    else {
        return Ok(());
    };

    for (member_id, value) in members {
        let record = Snowflake::parse(&member_id)
            .map_err(|e| e.to_string())
            .and_then(|member| {
                serde_json::from_value::<LegacyMember>(value)
                    .map(|legacy| DemographicRecord {
                        guild_id,
                        member_id: member,
                        name: legacy.name.unwrap_or_default(),
                        account_created: legacy
                            .account_created
                            .as_deref()
                            .and_then(parse_timestamp)
                            .or_else(|| member.created_at()),
                        joined_at: legacy.joined_at.as_deref().and_then(parse_timestamp),
                    })
                    .map_err(|e| e.to_string())
            });

        match record {
            Ok(record) => {
                upsert_record(&mut **tx, &record).await?;
                stats.demographics_imported += 1;
            }
            Err(e) => {
                stats.demographics_skipped += 1;
                stats.errors.push(format!("member {member_id}: {e}"));
            }
        }
    }

    Ok(())
}

async fn import_config(
    tx: &mut Transaction<'_, Sqlite>,
    guild_id: Snowflake,
    dir: &Path,
    stats: &mut GuildImportStats,
) -> Result<(), sqlx::Error> {
    if let Some(legacy) = read_json::<LegacyConfig>(&dir.join(CONFIG_FILE), stats) {
        save_config(&mut **tx, &legacy.into_config(guild_id)).await?;
        stats.config_imported = true;
    }
    Ok(())
}
