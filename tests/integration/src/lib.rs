//! Integration test utilities for the analytics add-on
//!
//! Provides an in-memory guild source, seeded stores and helpers for driving the
//! dashboard API and the trigger gateway, in process or over real sockets.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
