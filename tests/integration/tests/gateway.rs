//! Trigger gateway wire contract

use std::sync::Arc;

use analytics_core::{CountWindow, Snowflake};
use analytics_gateway::AnalyticsBot;
use analytics_service::AutoSnapshotOutcome;
use axum::http::StatusCode;
use integration_tests::{
    call, gateway_app, general_channel, get, guild, hidden_channel, locked_guild, members,
    memory_context, post_json, StaticGuildSource, TEST_TOKEN,
};
use serde_json::json;

fn source() -> StaticGuildSource {
    StaticGuildSource::new(vec![guild(1, "Alpha", 40), locked_guild(2, "Vault")])
        .with_members(1, members(4))
}

#[tokio::test]
async fn test_health() {
    let app = gateway_app(Arc::new(memory_context().await), source().shared());

    let (status, body) = call(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_fetch_members_auth_checks() {
    let app = gateway_app(Arc::new(memory_context().await), source().shared());
    let body = json!({ "guild_id": "1", "token": TEST_TOKEN });

    let (status, reply) = call(&app, post_json("/fetch_members", &body, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply, json!({ "success": false, "error": "Unauthorized" }));

    let (status, _) = call(&app, post_json("/fetch_members", &body, Some("nope"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong_body_token = json!({ "guild_id": "1", "token": "nope" });
    let (status, reply) = call(
        &app,
        post_json("/fetch_members", &wrong_body_token, Some(TEST_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["error"], "Invalid request data");

    let no_guild = json!({ "token": TEST_TOKEN });
    let (status, _) = call(&app, post_json("/fetch_members", &no_guild, Some(TEST_TOKEN))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fetch_members_failures() {
    let app = gateway_app(Arc::new(memory_context().await), source().shared());

    let unknown = json!({ "guild_id": "3", "token": TEST_TOKEN });
    let (status, reply) = call(&app, post_json("/fetch_members", &unknown, Some(TEST_TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(reply["error"], "Guild not found or not accessible");

    let hidden = json!({
        "guild_id": "1",
        "token": TEST_TOKEN,
        "channel_id": hidden_channel(1).to_string(),
    });
    let (status, reply) = call(&app, post_json("/fetch_members", &hidden, Some(TEST_TOKEN))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["error"], "Invalid or inaccessible channel ID.");

    let garbage = json!({ "guild_id": "1", "token": TEST_TOKEN, "channel_id": "general" });
    let (status, _) = call(&app, post_json("/fetch_members", &garbage, Some(TEST_TOKEN))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let locked = json!({ "guild_id": "2", "token": TEST_TOKEN });
    let (status, reply) = call(&app, post_json("/fetch_members", &locked, Some(TEST_TOKEN))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        reply["error"],
        "Failed to automatically choose channels; please specify them manually"
    );
}

#[tokio::test]
async fn test_fetch_members_stores_demographics() {
    let ctx = Arc::new(memory_context().await);
    let app = gateway_app(ctx.clone(), source().shared());

    let body = json!({ "guild_id": "1", "token": TEST_TOKEN });
    let (status, reply) = call(&app, post_json("/fetch_members", &body, Some(TEST_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["success"], true);
    assert_eq!(reply["members_fetched"], 4);
    assert_eq!(reply["guild_name"], "Alpha");
    assert_eq!(reply["message"], "Successfully fetched 4 members from Alpha");
    assert_eq!(reply["channel_id"], general_channel(1).to_string());

    // a second fetch upserts instead of duplicating
    call(&app, post_json("/fetch_members", &body, Some(TEST_TOKEN))).await;
    let stored = ctx
        .demographics_repo()
        .count_memberships(Some(Snowflake::new(1)), CountWindow::All)
        .await
        .unwrap();
    assert_eq!(stored, 4);
}

#[tokio::test]
async fn test_take_snapshot_records_manual_capture() {
    let ctx = Arc::new(memory_context().await);
    let app = gateway_app(ctx.clone(), source().shared());

    let body = json!({ "guild_id": "1", "token": TEST_TOKEN, "manual": true });
    let (status, reply) = call(&app, post_json("/take_snapshot", &body, Some(TEST_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["member_count"], 40);
    assert_eq!(reply["guild_name"], "Alpha");

    let snaps = ctx.snapshot_repo().find_by_guild(Snowflake::new(1)).await.unwrap();
    assert_eq!(snaps.len(), 1);
    assert!(!snaps[0].is_auto);

    let config = ctx.config_repo().find(Snowflake::new(1)).await.unwrap().unwrap();
    assert!(config.last_auto_snapshot.is_none());
    assert!(config.first_snapshot_date.is_some());
}

#[tokio::test]
async fn test_take_snapshot_never_claims_the_auto_slot() {
    let ctx = Arc::new(memory_context().await);
    let app = gateway_app(ctx.clone(), source().shared());

    let body = json!({ "guild_id": "1", "token": TEST_TOKEN, "manual": false });
    let (status, _) = call(&app, post_json("/take_snapshot", &body, Some(TEST_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);

    let snaps = ctx.snapshot_repo().find_by_guild(Snowflake::new(1)).await.unwrap();
    assert_eq!(snaps.len(), 1);
    assert!(!snaps[0].is_auto);

    let config = ctx.config_repo().find(Snowflake::new(1)).await.unwrap().unwrap();
    assert!(config.last_auto_snapshot.is_none());
}

#[tokio::test]
async fn test_bot_commands_share_the_store() {
    let ctx = Arc::new(memory_context().await);
    let bot = AnalyticsBot::new(ctx.clone(), source().shared());

    assert!(bot.on_message(Snowflake::new(1), "hello there").await.is_none());

    let reply = bot
        .on_message(Snowflake::new(1), "analytics ss")
        .await
        .expect("command reply");
    assert!(reply.text.contains("40"));

    let reply = bot.handle_command(Snowflake::new(1), "export").await;
    let attachment = reply.attachment.expect("csv attachment");
    assert!(attachment.filename.starts_with("1_analytics_"));
    assert_eq!(attachment.content.lines().count(), 2);

    let app = gateway_app(ctx, source().shared());
    let body = json!({ "guild_id": "1", "token": TEST_TOKEN });
    let (status, _) = call(&app, post_json("/take_snapshot", &body, Some(TEST_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);

    let reply = bot.handle_command(Snowflake::new(1), "status").await;
    assert!(reply.text.contains("Alpha"));
}

#[tokio::test]
async fn test_activity_hook_respects_auto_setting() {
    let ctx = Arc::new(memory_context().await);
    let bot = AnalyticsBot::new(ctx.clone(), source().shared());

    let outcome = bot.on_guild_activity(Snowflake::new(1)).await.unwrap();
    assert_eq!(outcome, AutoSnapshotOutcome::Disabled);

    bot.handle_command(Snowflake::new(1), "auto on").await;
    let outcome = bot.on_guild_activity(Snowflake::new(1)).await.unwrap();
    assert!(matches!(outcome, AutoSnapshotOutcome::Taken(_)));

    // the interval has not elapsed yet
    let outcome = bot.on_guild_activity(Snowflake::new(1)).await.unwrap();
    assert_eq!(outcome, AutoSnapshotOutcome::NotDue);

    assert!(bot.on_guild_activity(Snowflake::new(3)).await.is_err());
}
