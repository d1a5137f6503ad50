//! HTTP clients towards the bot gateway and the dashboard

mod notifier;
mod trigger;

pub use notifier::HttpSnapshotNotifier;
pub use trigger::{BotTrigger, TriggerClient, TriggerError};
