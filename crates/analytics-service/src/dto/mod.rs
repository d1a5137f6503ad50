//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for dashboard inputs
//! - Response DTOs for serializing dashboard outputs
//! - The trigger gateway wire contract

pub mod gateway;
pub mod requests;
pub mod responses;

pub use gateway::{
    GatewayErrorBody, GatewayFetchRequest, GatewayFetchResponse, GatewaySnapshotRequest,
    GatewaySnapshotResponse,
};

pub use requests::{
    DaysQuery, FetchMembersTrigger, GuildFilterQuery, MembersOverTimeQuery, SearchUserQuery,
    SnapshotGroupQuery, SnapshotNotification, UpdateConfigRequest, UserHistoryQuery,
    DEFAULT_SEARCH_LIMIT, MAX_SEARCH_OFFSET,
};

pub use responses::{
    CompareResponse, CountResponse, DemographicsResponse, FetchMembersResponse, HealthResponse,
    MemberSearchResult, RankedMemberResponse, SearchResponse, ServerConfigResponse,
    ServerStatsResponse, ServerSummary, SnapshotPoint, Stats24hResponse, SuccessResponse,
    SweepResponse, TakeSnapshotResponse, TrendResponse, WindowStats,
};
