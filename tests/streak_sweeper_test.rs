// ABOUTME: Integration tests for the stale streak sweep and the update outbox
// ABOUTME: Covers selection rules, hard resets, retry delivery, and statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

//! Stale Streak Sweep Integration Tests
//!
//! The sweep repairs records for users who stopped logging entirely, so no
//! advance/reset ever fires for them. These tests seed records at various
//! distances behind today and assert which ones the sweep touches.

mod common;

use chrono::Days;
use rehab_tracker::constants::limits;
use rehab_tracker::database::Database;
use rehab_tracker::services::StreakService;
use uuid::Uuid;

async fn setup() -> anyhow::Result<(Database, StreakService)> {
    let database = common::create_test_database().await?;
    let service = StreakService::new(database.clone());
    Ok((database, service))
}

#[tokio::test]
async fn sweep_resets_long_inactive_user() -> anyhow::Result<()> {
    let (database, service) = setup().await?;
    let user_id = Uuid::new_v4();
    let today = common::today();
    let five_days_ago = today.checked_sub_days(Days::new(5)).unwrap();

    common::seed_streak(&database, user_id, 7, 7, five_days_ago).await?;

    let reset_count = service.cleanup_stale_streaks().await?;
    assert_eq!(reset_count, 1);

    let streak = database.streaks().get(user_id).await?.unwrap();
    assert_eq!(streak.current_streak, 0);
    assert_eq!(streak.last_active_date, today);
    // The all-time best survives the reset.
    assert_eq!(streak.max_streak, 7);

    Ok(())
}

#[tokio::test]
async fn sweep_spares_user_active_yesterday() -> anyhow::Result<()> {
    let (database, service) = setup().await?;
    let user_id = Uuid::new_v4();
    let today = common::today();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap();

    // Selected by the scan, but only one day behind: today is still in
    // reach, so the streak is not broken yet.
    common::seed_streak(&database, user_id, 3, 3, yesterday).await?;

    let reset_count = service.cleanup_stale_streaks().await?;
    assert_eq!(reset_count, 0);

    let streak = database.streaks().get(user_id).await?.unwrap();
    assert_eq!(streak.current_streak, 3);
    assert_eq!(streak.last_active_date, yesterday);

    Ok(())
}

#[tokio::test]
async fn sweep_ignores_zero_streaks() -> anyhow::Result<()> {
    let (database, service) = setup().await?;
    let user_id = Uuid::new_v4();
    let today = common::today();
    let long_ago = today.checked_sub_days(Days::new(30)).unwrap();

    common::seed_streak(&database, user_id, 0, 12, long_ago).await?;

    let reset_count = service.cleanup_stale_streaks().await?;
    assert_eq!(reset_count, 0);

    let streak = database.streaks().get(user_id).await?.unwrap();
    assert_eq!(streak.last_active_date, long_ago);

    Ok(())
}

#[tokio::test]
async fn sweep_handles_multiple_users_independently() -> anyhow::Result<()> {
    let (database, service) = setup().await?;
    let today = common::today();

    let stale_a = Uuid::new_v4();
    let stale_b = Uuid::new_v4();
    let fresh = Uuid::new_v4();
    common::seed_streak(&database, stale_a, 4, 9, today.checked_sub_days(Days::new(3)).unwrap())
        .await?;
    common::seed_streak(&database, stale_b, 2, 2, today.checked_sub_days(Days::new(10)).unwrap())
        .await?;
    common::seed_streak(&database, fresh, 5, 5, today).await?;

    let reset_count = service.cleanup_stale_streaks().await?;
    assert_eq!(reset_count, 2);

    assert_eq!(database.streaks().get(stale_a).await?.unwrap().current_streak, 0);
    assert_eq!(database.streaks().get(stale_b).await?.unwrap().current_streak, 0);
    assert_eq!(database.streaks().get(fresh).await?.unwrap().current_streak, 5);

    Ok(())
}

#[tokio::test]
async fn active_streak_count_reflects_positive_streaks_only() -> anyhow::Result<()> {
    let (database, service) = setup().await?;
    let today = common::today();

    common::seed_streak(&database, Uuid::new_v4(), 3, 3, today).await?;
    common::seed_streak(&database, Uuid::new_v4(), 1, 4, today).await?;
    common::seed_streak(&database, Uuid::new_v4(), 0, 9, today).await?;

    assert_eq!(service.count_active_streaks().await?, 2);

    Ok(())
}

#[tokio::test]
async fn outbox_redelivers_parked_streak_update() -> anyhow::Result<()> {
    let (database, service) = setup().await?;
    let user_id = Uuid::new_v4();
    let today = common::today();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap();

    common::seed_streak(&database, user_id, 2, 2, yesterday).await?;

    // A streak update that failed inline sits in the outbox.
    database
        .outbox()
        .enqueue(user_id, today, 80, 0, "simulated failure")
        .await?;

    let delivered = service.drain_outbox().await?;
    assert_eq!(delivered, 1);

    let streak = database.streaks().get(user_id).await?.unwrap();
    assert_eq!(streak.current_streak, 3);
    assert_eq!(streak.last_active_date, today);

    // Delivered entries leave the queue.
    let remaining = database
        .outbox()
        .pending(10)
        .await?;
    assert!(remaining.is_empty());

    Ok(())
}

#[tokio::test]
async fn outbox_stops_retrying_after_attempt_cap() -> anyhow::Result<()> {
    let (database, _service) = setup().await?;
    let user_id = Uuid::new_v4();
    let today = common::today();

    let outbox = database.outbox();
    let id = outbox
        .enqueue(user_id, today, 80, 0, "simulated failure")
        .await?;

    for _ in 0..limits::OUTBOX_MAX_ATTEMPTS {
        outbox
            .record_failure(id, "still failing")
            .await?;
    }

    let pending = outbox
        .pending(10)
        .await?;
    assert!(pending.is_empty());

    Ok(())
}

#[tokio::test]
async fn leaderboard_orders_by_max_then_current() -> anyhow::Result<()> {
    let (database, service) = setup().await?;
    let today = common::today();

    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let third = Uuid::new_v4();
    common::seed_streak(&database, third, 5, 7, today).await?;
    common::seed_streak(&database, first, 2, 10, today).await?;
    common::seed_streak(&database, second, 6, 7, today).await?;

    let top = service.top_streaks(3).await?;
    let ids: Vec<Uuid> = top.iter().map(|s| s.user_id).collect();
    assert_eq!(ids, vec![first, second, third]);

    Ok(())
}
