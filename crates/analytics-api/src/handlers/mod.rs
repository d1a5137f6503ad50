//! Route handlers
//!
//! All HTTP request handlers organized by dashboard area.

pub mod config;
pub mod health;
pub mod members;
pub mod servers;
pub mod stats;
pub mod triggers;
