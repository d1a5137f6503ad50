//! In-chat `analytics` command surface
//!
//! [`Command::parse`] turns the text after the command prefix into a [`Command`];
//! [`CommandDispatcher`] runs it against the services and renders a [`CommandReply`].

mod dispatcher;
mod export;
mod render;

pub use dispatcher::CommandDispatcher;
pub use export::{export_csv, export_filename, CSV_HEADER};

/// Subcommand aliases
const ALIASES: &[(&str, &str)] = &[
    ("ss", "snapshot"),
    ("rep", "report"),
    ("clr", "clear"),
    ("stat", "status"),
    ("mem", "members"),
    ("tr", "trend"),
    ("cmp", "compare"),
    ("exp", "export"),
    ("ret", "retention"),
    ("int", "interval"),
    ("demo", "demographics"),
    ("holy", "holylogger"),
    ("resetdb", "reset"),
    ("?", "help"),
];

const ON_WORDS: &[&str] = &["on", "true", "yes", "enable", "1"];
const OFF_WORDS: &[&str] = &["off", "false", "no", "disable", "0"];

/// Lookback of `compare` without an argument
pub const DEFAULT_COMPARE_DAYS: i64 = 7;
/// Longest lookback `compare` accepts
pub const MAX_COMPARE_DAYS: i64 = 3650;

/// `analytics demographics ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemographicsAction {
    /// Show the summary, fetching first when nothing is stored
    Summary,
    /// Fetch members, optionally through the given channel id
    Fetch(Option<String>),
    List,
    Remove(String),
    Usage,
}

/// A parsed `analytics` command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Snapshot,
    Report,
    Clear,
    Status,
    Members,
    Trend,
    Compare { days: i64 },
    Export,
    /// `None` shows the current setting
    Auto(Option<bool>),
    Retention(Option<i64>),
    Interval(Option<f64>),
    Demographics(DemographicsAction),
    DbStats,
    Holylogger,
    Boosters,
    Prune,
    Reset { confirmed: bool },
    /// A known subcommand with an argument it cannot use
    InvalidArgument,
    /// Full input of an unrecognised command
    Unknown(String),
}

impl Command {
    /// Parse the words following the command prefix. Empty input means `help`.
    pub fn parse(input: &str) -> Self {
        let mut words = input.split_whitespace();
        let Some(first) = words.next() else {
            return Self::Help;
        };
        let name = first.to_lowercase();
        let name = ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, full)| *full)
            .unwrap_or(name.as_str());
        let arg = words.next();
        let extra = words.next();

        match name {
            "help" => Self::Help,
            "snapshot" => Self::Snapshot,
            "report" => Self::Report,
            "clear" => Self::Clear,
            "status" => Self::Status,
            "members" => Self::Members,
            "trend" => Self::Trend,
            "compare" => match arg.map(str::parse::<i64>) {
                Some(Ok(days)) if (1..=MAX_COMPARE_DAYS).contains(&days) => Self::Compare { days },
                Some(Ok(_)) => Self::InvalidArgument,
                Some(Err(_)) | None => Self::Compare {
                    days: DEFAULT_COMPARE_DAYS,
                },
            },
            "export" => Self::Export,
            "auto" => Self::Auto(arg.and_then(switch)),
            "retention" => Self::Retention(arg.and_then(|a| a.parse::<i64>().ok())),
            "interval" => match arg {
                None => Self::Interval(None),
                Some(raw) => match raw.parse::<f64>() {
                    Ok(hours) => Self::Interval(Some(hours)),
                    Err(_) => Self::InvalidArgument,
                },
            },
            "demographics" => Self::Demographics(match (arg.map(str::to_lowercase).as_deref(), extra) {
                (None, _) => DemographicsAction::Summary,
                (Some("fetch"), channel) => DemographicsAction::Fetch(channel.map(str::to_string)),
                (Some("list"), _) => DemographicsAction::List,
                (Some("remove"), Some(id)) => DemographicsAction::Remove(id.to_string()),
                _ => DemographicsAction::Usage,
            }),
            "dbstats" => Self::DbStats,
            "holylogger" => Self::Holylogger,
            "boosters" => Self::Boosters,
            "prune" => Self::Prune,
            // `reset confirm`, `resetdb confirm` and `reset database confirm`
            "reset" => Self::Reset {
                confirmed: arg.is_some_and(is_confirm)
                    || (arg == Some("database") && extra.is_some_and(is_confirm)),
            },
            _ => Self::Unknown(input.trim().to_string()),
        }
    }
}

fn switch(word: &str) -> Option<bool> {
    let word = word.to_lowercase();
    if ON_WORDS.contains(&word.as_str()) {
        Some(true)
    } else if OFF_WORDS.contains(&word.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn is_confirm(word: &str) -> bool {
    word.eq_ignore_ascii_case("confirm")
}

/// File attached to a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: String,
}

/// What the bot posts back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl CommandReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(text: impl Into<String>, attachment: Attachment) -> Self {
        Self {
            text: text.into(),
            attachment: Some(attachment),
        }
    }
}
