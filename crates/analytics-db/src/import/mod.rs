//! One-shot import of the legacy per-guild JSON store
//!
//! Layout read from the source directory:
//!
//! ```text
//! <source>/<guild_id>/member_snapshots.json     {"snapshots": [...]}
//! <source>/<guild_id>/member_demographics.json  {"<member_id>": {...}}
//! <source>/<guild_id>/analytics_config.json     {...}
//! <servers file>                                ["<guild_id>", ...]
//! ```

mod legacy;

pub use legacy::{GuildImportStats, ImportError, ImportReport, LegacyImporter};
