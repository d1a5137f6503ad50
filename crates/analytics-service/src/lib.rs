//! # analytics-service
//!
//! Application layer: the snapshot collector, dashboard queries, the chat command set,
//! batch sweeps and the HTTP clients that connect the dashboard with the bot.

pub mod clients;
pub mod commands;
pub mod dto;
pub mod services;

pub use clients::{BotTrigger, HttpSnapshotNotifier, TriggerClient, TriggerError};
pub use commands::{Attachment, Command, CommandDispatcher, CommandReply, DemographicsAction};
pub use dto::*;
pub use services::*;
