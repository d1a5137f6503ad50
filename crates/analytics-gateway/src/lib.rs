//! # analytics-gateway
//!
//! Bot-side half of the add-on. The bot embeds [`AnalyticsBot`] with its own
//! [`GuildSource`](analytics_core::GuildSource) to answer chat commands and drive automatic
//! snapshots, and serves the trigger API the dashboard calls.

pub mod bot;
pub mod handlers;
pub mod server;

pub use bot::AnalyticsBot;
pub use server::{create_app, create_gateway_state, create_router, run, GatewayState};
