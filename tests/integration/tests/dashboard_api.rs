//! Dashboard API driven in process against an in-memory store

use std::sync::{Arc, Mutex};

use analytics_core::Snowflake;
use analytics_service::{
    BotTrigger, DemographicsService, GatewayFetchResponse, GatewaySnapshotResponse,
    TriggerError,
};
use async_trait::async_trait;
use axum::http::StatusCode;
use integration_tests::{
    call, dashboard_app, general_channel, get, guild, members, memory_context, post_empty,
    post_json, seed_snapshots, StaticGuildSource, TEST_TOKEN,
};
use serde_json::json;

/// Gateway stand-in that rejects `missing` with a 404 and records calls
#[derive(Default)]
struct ScriptedTrigger {
    missing: Vec<Snowflake>,
    calls: Mutex<Vec<(Snowflake, Option<Snowflake>)>>,
}

impl ScriptedTrigger {
    fn check(&self, guild_id: Snowflake, channel: Option<Snowflake>) -> Result<(), TriggerError> {
        self.calls.lock().unwrap().push((guild_id, channel));
        if self.missing.contains(&guild_id) {
            return Err(TriggerError::Rejected {
                status: 404,
                message: "Guild not found or not accessible".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BotTrigger for ScriptedTrigger {
    async fn take_snapshot(
        &self,
        guild_id: Snowflake,
    ) -> Result<GatewaySnapshotResponse, TriggerError> {
        self.check(guild_id, None)?;
        Ok(GatewaySnapshotResponse {
            success: true,
            guild_name: "Alpha".to_string(),
            member_count: 77,
            timestamp: "2024-03-05T12:00:00.000000+00:00".to_string(),
        })
    }

    async fn fetch_members(
        &self,
        guild_id: Snowflake,
        channel_id: Option<Snowflake>,
    ) -> Result<GatewayFetchResponse, TriggerError> {
        self.check(guild_id, channel_id)?;
        Ok(GatewayFetchResponse {
            success: true,
            guild_name: "Alpha".to_string(),
            members_fetched: 12,
            message: "Successfully fetched 12 members from Alpha".to_string(),
            channel_id: channel_id.map(|c| c.to_string()),
        })
    }
}

// ============================================================================
// Health and counters
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = dashboard_app(memory_context().await, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_snapshot_counters_with_guild_filter() {
    let ctx = memory_context().await;
    seed_snapshots(&ctx, &guild(1, "Alpha", 0), &[100, 110, 120]).await;
    seed_snapshots(&ctx, &guild(2, "Beta", 0), &[50]).await;
    let app = dashboard_app(ctx, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(&app, get("/api/total_snapshots")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "count": 4 }));

    let (_, body) = call(&app, get("/api/total_snapshots?guild_id=1")).await;
    assert_eq!(body, json!({ "count": 3 }));

    let (_, body) = call(&app, get("/api/total_snapshots?guild_id=")).await;
    assert_eq!(body, json!({ "count": 4 }));
}

#[tokio::test]
async fn test_bad_guild_filter_is_rejected() {
    let app = dashboard_app(memory_context().await, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(&app, get("/api/user_count?guild_id=alpha")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid guild_id format");
    assert_eq!(body["code"], "INVALID_QUERY_PARAMETER");
}

#[tokio::test]
async fn test_members_over_time_rejects_out_of_range_days() {
    let ctx = memory_context().await;
    seed_snapshots(&ctx, &guild(1, "Alpha", 0), &[100]).await;
    let app = dashboard_app(ctx, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(&app, get("/api/members_over_time?days=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "days must be between 1 and 3650");

    let (status, body) = call(&app, get("/api/members_over_time?days=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["labels"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["counts"].as_array().map(Vec::len), Some(3));
}

// ============================================================================
// Server views
// ============================================================================

#[tokio::test]
async fn test_server_list_and_snapshots() {
    let ctx = memory_context().await;
    seed_snapshots(&ctx, &guild(1, "Alpha", 0), &[100, 110]).await;
    let app = dashboard_app(ctx, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(&app, get("/api/servers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": "1", "name": "Alpha" }]));

    let (status, body) = call(&app, get("/api/server/1/snapshots?group=day")).await;
    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1]["member_count"], 110);

    let (status, body) = call(&app, get("/api/server/1/snapshots?group=day&days=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(5));

    let (status, body) = call(&app, get("/api/server/1/snapshots?group=week&days=1")).await;
    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert!(points[0]["timestamp"].as_str().unwrap().contains("-W"));

    let (status, body) = call(&app, get("/api/server/1/snapshots?days=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "days must be between 1 and 3650");

    let (status, _) = call(&app, get("/api/server/abc/snapshots")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_server_stats_empty_object_without_snapshots() {
    let ctx = memory_context().await;
    seed_snapshots(&ctx, &guild(1, "Alpha", 0), &[100, 130, 120]).await;
    let app = dashboard_app(ctx, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(&app, get("/api/server/2/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (_, body) = call(&app, get("/api/server/1/stats")).await;
    assert_eq!(body["peak_member_count"], 130);
    assert_eq!(body["current_member_count"], 120);
    assert_eq!(body["change_since_first"], "+20");
    assert_eq!(body["total_snapshots"], 3);
}

#[tokio::test]
async fn test_trend_and_compare() {
    let ctx = memory_context().await;
    let app = dashboard_app(ctx, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(&app, get("/api/server/1/trend")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trend"], "insufficient_data");

    let (status, body) = call(&app, get("/api/server/1/compare?days=14")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days"], 14);
    assert_eq!(body["insufficient_data"], true);
}

#[tokio::test]
async fn test_demographics_and_search() {
    let ctx = memory_context().await;
    let source = StaticGuildSource::new(vec![guild(1, "Alpha", 5)]).with_members(1, members(5));
    DemographicsService::new(&ctx)
        .fetch(&source, Snowflake::new(1), Some(general_channel(1)))
        .await
        .unwrap();
    let app = dashboard_app(ctx, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(&app, get("/api/server/1/demographics")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_object());

    let (_, body) = call(&app, get("/api/membership_count?guild_id=1")).await;
    assert_eq!(body, json!({ "count": 5 }));

    let (status, body) = call(&app, get("/api/search_user?q=member&limit=2&offset=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["has_more"], true);
    assert_eq!(body["results"].as_array().map(Vec::len), Some(2));

    let (_, body) = call(&app, get("/api/search_user?q=member-4")).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["limit"], 250);
    assert_eq!(body["has_more"], false);

    let (status, _) = call(&app, get("/api/search_user?q=x&limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        call(&app, get("/api/search_user?q=member&offset=9223372036854775807")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "offset must be between 0 and 1000000000");
}

#[tokio::test]
async fn test_user_history_requires_member_id() {
    let ctx = memory_context().await;
    let source = StaticGuildSource::new(vec![guild(1, "Alpha", 3)]).with_members(1, members(3));
    DemographicsService::new(&ctx)
        .fetch(&source, Snowflake::new(1), Some(general_channel(1)))
        .await
        .unwrap();
    let app = dashboard_app(ctx, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(&app, get("/api/user_history?member_id=1002")).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["guild_id"], "1");
    assert_eq!(rows[0]["name"], "member-2");

    let (_, body) = call(&app, get("/api/user_history?member_id=42")).await;
    assert_eq!(body, json!([]));

    let (status, body) = call(&app, get("/api/user_history")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing member_id");

    let (status, body) = call(&app, get("/api/user_history?member_id=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_QUERY_PARAMETER");
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_update_config_and_list() {
    let ctx = memory_context().await;
    seed_snapshots(&ctx, &guild(1, "Alpha", 0), &[100]).await;
    let app = dashboard_app(ctx, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(
        &app,
        post_json("/api/update_config", &json!({ "field": "chart_style" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing guild_id or field");

    let (status, body) = call(
        &app,
        post_json(
            "/api/update_config",
            &json!({ "guild_id": "1", "field": "colour", "value": "red" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid field: colour");

    let (status, body) = call(
        &app,
        post_json(
            "/api/update_config",
            &json!({ "guild_id": "1", "field": "snapshot_retention_days", "value": 1e300 }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "snapshot_retention_days must be at most 36500");
    assert_eq!(body["code"], "TOO_LARGE");

    let (status, body) = call(
        &app,
        post_json(
            "/api/update_config",
            &json!({ "guild_id": "1", "field": "auto_snapshot_interval_hours", "value": 6 }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = call(&app, get("/api/server_configs")).await;
    assert_eq!(status, StatusCode::OK);
    let configs = body.as_array().unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0]["guild_id"], "1");
    assert_eq!(configs[0]["guild_name"], "Alpha");
    assert_eq!(configs[0]["auto_snapshot_interval_hours"], 6.0);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_request_data() {
    let app = dashboard_app(memory_context().await, Arc::new(ScriptedTrigger::default()));

    let (status, body) = call(&app, post_json("/api/update_config", &json!([1, 2]), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request data");
}

// ============================================================================
// Triggers
// ============================================================================

#[tokio::test]
async fn test_triggers_forward_to_gateway() {
    let trigger = Arc::new(ScriptedTrigger::default());
    let app = dashboard_app(memory_context().await, trigger.clone());

    let (status, body) = call(&app, post_empty("/api/take_snapshot/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["member_count"], 77);
    assert_eq!(body["message"], "Snapshot taken successfully for server 1");

    let (status, body) = call(
        &app,
        post_json("/api/fetch_members/1", &json!({ "channel_id": "11" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members_fetched"], 12);

    let calls = trigger.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            (Snowflake::new(1), None),
            (Snowflake::new(1), Some(Snowflake::new(11)))
        ]
    );
}

#[tokio::test]
async fn test_gateway_status_passes_through() {
    let trigger = Arc::new(ScriptedTrigger {
        missing: vec![Snowflake::new(9)],
        ..Default::default()
    });
    let app = dashboard_app(memory_context().await, trigger);

    let (status, body) = call(&app, post_empty("/api/take_snapshot/9")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Guild not found or not accessible");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_snapshot_all_collects_failures() {
    let ctx = memory_context().await;
    seed_snapshots(&ctx, &guild(1, "Alpha", 0), &[10]).await;
    seed_snapshots(&ctx, &guild(9, "Gone", 0), &[10]).await;
    let trigger = Arc::new(ScriptedTrigger {
        missing: vec![Snowflake::new(9)],
        ..Default::default()
    });
    let app = dashboard_app(ctx, trigger);

    let (status, body) = call(&app, post_empty("/api/snapshot_all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["count"], 1);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("9: Guild not found or not accessible"));

    let (status, body) = call(&app, post_empty("/api/fetch_all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_notification_requires_bearer_token() {
    let app = dashboard_app(memory_context().await, Arc::new(ScriptedTrigger::default()));
    let notice = json!({ "guild_id": "1", "guild_name": "Alpha", "member_count": 5 });

    let (status, body) = call(
        &app,
        post_json("/api/auto_snapshot_notification", &notice, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = call(
        &app,
        post_json("/api/auto_snapshot_notification", &notice, Some("wrong")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(
        &app,
        post_json("/api/auto_snapshot_notification", &notice, Some(TEST_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}
