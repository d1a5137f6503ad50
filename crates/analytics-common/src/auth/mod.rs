//! Shared-secret bearer authentication

mod token;

pub use token::{bearer_matches, ApiToken};
