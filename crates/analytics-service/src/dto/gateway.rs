//! Wire contract of the trigger gateway
//!
//! Shared by the gateway routes and the dashboard's HTTP client.

use serde::{Deserialize, Serialize};

/// POST /fetch_members
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayFetchRequest {
    pub guild_id: Option<String>,
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayFetchResponse {
    pub success: bool,
    pub guild_name: String,
    pub members_fetched: i64,
    pub message: String,
    pub channel_id: Option<String>,
}

/// POST /take_snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewaySnapshotRequest {
    pub guild_id: Option<String>,
    pub token: Option<String>,
    /// Accepted for wire compatibility; gateway captures are always manual
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySnapshotResponse {
    pub success: bool,
    pub guild_name: String,
    pub member_count: i64,
    pub timestamp: String,
}

/// Error body used by the gateway, `{success: false, error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayErrorBody {
    #[serde(default)]
    pub success: bool,
    pub error: String,
}
