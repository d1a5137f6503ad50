//! Demographic database model

use sqlx::FromRow;

/// Database model for the demographics table
#[derive(Debug, Clone, FromRow)]
pub struct DemographicModel {
    pub guild_id: String,
    pub member_id: String,
    pub name: Option<String>,
    pub account_created: Option<String>,
    pub joined_at: Option<String>,
}
