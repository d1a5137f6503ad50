//! Dashboard and gateway over real sockets

use std::sync::Arc;

use integration_tests::{
    assert_json, closed_port_url, dashboard_app_for, gateway_app, guild, members,
    memory_context, StaticGuildSource, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Both halves over one store, as when the bot and dashboard share a database file
async fn start_pair() -> (TestServer, TestServer) {
    let source = StaticGuildSource::new(vec![guild(1, "Alpha", 25)])
        .with_members(1, members(3))
        .shared();

    let ctx = memory_context().await;
    let gateway_ctx = Arc::new(ctx.clone());
    let gateway = TestServer::start(gateway_app(gateway_ctx, source))
        .await
        .expect("gateway server");

    let dashboard = TestServer::start(
        dashboard_app_for(ctx, &gateway.base_url()).expect("dashboard app"),
    )
    .await
    .expect("dashboard server");

    (gateway, dashboard)
}

#[tokio::test]
async fn test_take_snapshot_round_trip() {
    let (_gateway, dashboard) = start_pair().await;

    let response = dashboard.post("/api/take_snapshot/1").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["member_count"], 25);
    assert_eq!(body["guild_name"], "Alpha");

    let response = dashboard.get("/api/total_snapshots?guild_id=1").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body, json!({ "count": 1 }));
}

#[tokio::test]
async fn test_fetch_members_round_trip() {
    let (_gateway, dashboard) = start_pair().await;

    let response = dashboard
        .post_json("/api/fetch_members/1", &json!({}))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["members_fetched"], 3);
    assert_eq!(body["message"], "Successfully fetched 3 members from Alpha");

    let response = dashboard.get("/api/user_count").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body, json!({ "count": 3 }));
}

#[tokio::test]
async fn test_gateway_errors_keep_their_status() {
    let (_gateway, dashboard) = start_pair().await;

    let response = dashboard.post("/api/take_snapshot/2").await.unwrap();
    let body: Value = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body["error"], "Guild not found or not accessible");

    let response = dashboard
        .post_json("/api/fetch_members/1", &json!({ "channel_id": "999" }))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"], "Invalid or inaccessible channel ID.");
}

#[tokio::test]
async fn test_unreachable_gateway_is_503() {
    let url = closed_port_url().await.unwrap();
    let dashboard = TestServer::start(
        dashboard_app_for(memory_context().await, &url).expect("dashboard app"),
    )
    .await
    .unwrap();

    let response = dashboard.post("/api/take_snapshot/1").await.unwrap();
    let body: Value = assert_json(response, StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Bot gateway unreachable"));
}
