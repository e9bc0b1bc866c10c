// ABOUTME: HTTP integration tests for the summary and streak routes
// ABOUTME: Validates routing, identity extraction, range clamping, and error bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

//! HTTP integration tests for the rehab-tracker routes
//!
//! Drives the assembled router in-process with `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::Router;
use http::{Request, StatusCode};
use rehab_tracker::config::environment::ServerConfig;
use rehab_tracker::context::ServerResources;
use rehab_tracker::routes;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    resources: Arc<ServerResources>,
    router: Router,
    user_id: Uuid,
}

async fn setup() -> anyhow::Result<TestApp> {
    let database = common::create_test_database().await?;
    let resources = Arc::new(ServerResources::new(database, ServerConfig::default()));
    let router = routes::router(Arc::clone(&resources));
    Ok(TestApp {
        resources,
        router,
        user_id: Uuid::new_v4(),
    })
}

async fn body_json(body: Body) -> anyhow::Result<Value> {
    let bytes = to_bytes(body, usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_endpoints_respond() -> anyhow::Result<()> {
    let app = setup().await?;

    for uri in ["/health", "/ready"] {
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    Ok(())
}

#[tokio::test]
async fn streak_requires_user_identity() -> anyhow::Result<()> {
    let app = setup().await?;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/api/v1/streak").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response.into_body()).await?;
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

    Ok(())
}

#[tokio::test]
async fn streak_range_is_clamped_to_ninety_days() -> anyhow::Result<()> {
    let app = setup().await?;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/streak?range=500")
                .header("x-user-id", app.user_id.to_string())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await?;
    assert_eq!(body["current_streak"], 0);
    assert_eq!(body["activity_history"].as_array().unwrap().len(), 90);

    Ok(())
}

#[tokio::test]
async fn streak_defaults_to_thirty_days_of_history() -> anyhow::Result<()> {
    let app = setup().await?;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/streak")
                .header("x-user-id", app.user_id.to_string())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await?;
    assert_eq!(body["activity_history"].as_array().unwrap().len(), 30);

    Ok(())
}

#[tokio::test]
async fn missing_summary_returns_not_found_body() -> anyhow::Result<()> {
    let app = setup().await?;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/summary/daily?date=2025-01-01")
                .header("x-user-id", app.user_id.to_string())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response.into_body()).await?;
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn recompute_then_read_round_trips() -> anyhow::Result<()> {
    let app = setup().await?;
    let today = common::today();

    common::create_active_plan(&app.resources.database, app.user_id, 2, 0, 0).await?;
    common::log_exercise(&app.resources.database, app.user_id, today, 90).await?;
    common::log_exercise(&app.resources.database, app.user_id, today, 85).await?;

    let recompute = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/summary/recompute")
                .header("x-user-id", app.user_id.to_string())
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "timestamp": common::noon(today) }).to_string(),
                ))?,
        )
        .await?;
    assert_eq!(recompute.status(), StatusCode::ACCEPTED);

    let read = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/summary/daily?date={today}"))
                .header("x-user-id", app.user_id.to_string())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(read.status(), StatusCode::OK);

    let body = body_json(read.into_body()).await?;
    assert_eq!(body["exercise_completion_rate"], 100);
    assert_eq!(body["all_exercises_completed"], true);
    assert_eq!(body["user_id"], app.user_id.to_string());

    // The qualifying day also advanced the streak snapshot.
    let streak = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/streak?range=1")
                .header("x-user-id", app.user_id.to_string())
                .body(Body::empty())?,
        )
        .await?;
    let body = body_json(streak.into_body()).await?;
    assert_eq!(body["last_active_date"], today.to_string());
    assert_eq!(body["activity_history"][0]["is_active"], true);

    Ok(())
}

#[tokio::test]
async fn simple_streak_reports_today_activity() -> anyhow::Result<()> {
    let app = setup().await?;
    let today = common::today();

    common::seed_streak(&app.resources.database, app.user_id, 4, 6, today).await?;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/streak/simple")
                .header("x-user-id", app.user_id.to_string())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await?;
    assert_eq!(body["current_streak"], 4);
    assert_eq!(body["max_streak"], 6);
    assert_eq!(body["active_today"], true);
    assert!(body.get("activity_history").is_none());

    Ok(())
}

#[tokio::test]
async fn leaderboard_lists_seeded_streaks() -> anyhow::Result<()> {
    let app = setup().await?;
    let today = common::today();

    common::seed_streak(&app.resources.database, Uuid::new_v4(), 3, 9, today).await?;
    common::seed_streak(&app.resources.database, Uuid::new_v4(), 5, 5, today).await?;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/streak/leaderboard?limit=10")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await?;
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["max_streak"], 9);

    Ok(())
}

#[tokio::test]
async fn invalid_user_header_is_rejected() -> anyhow::Result<()> {
    let app = setup().await?;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/streak")
                .header("x-user-id", "not-a-uuid")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response.into_body()).await?;
    assert_eq!(body["error"]["code"], "AUTH_INVALID");

    Ok(())
}
