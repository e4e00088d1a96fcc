// these tests use #[serial] to run sequentially because setup_db() recreates
// the database each time. without serial, parallel tests would interfere
// with each other's data.

//! End-to-end tests for `SQLite` repositories.
//!
//! These tests use an in-memory `SQLite` database.
//! Run with: `cargo test --features sqlx_sqlite --test e2e_sqlite`

#![cfg(feature = "sqlx_sqlite")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use portcullis::actions::LoginGate;
use portcullis::crypto::{Argon2Hasher, PasswordHasher};
use portcullis::sqlite::{
    migrations, SqliteAttemptStore, SqliteTokenRepository, SqliteUserRepository,
};
use portcullis::{
    AttemptRecord, AttemptStore, AttemptTracker, AuthError, PasswordVerifier, SecretString,
    TokenRepository, UserRepository,
};
use serial_test::serial;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

const EMAIL: &str = "user@example.com";

async fn setup_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory SQLite database");

    migrations::run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

#[tokio::test]
#[serial]
async fn test_migrations_are_idempotent() {
    let pool = setup_db().await;
    migrations::run(&pool).await.expect("second run failed");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _portcullis_migrations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(applied, 3);
}

#[tokio::test]
#[serial]
async fn test_attempt_store_increment_and_reset() {
    let pool = setup_db().await;
    let store = SqliteAttemptStore::new(pool);
    let now = Utc::now();
    let stale_before = now - Duration::hours(24);

    assert!(store.get(EMAIL).await.unwrap().is_none());

    for expected in 1..=3 {
        let record = store.increment(EMAIL, now, stale_before).await.unwrap();
        assert_eq!(record.count, expected);
        assert_eq!(record.last_try, now);
    }

    // not stale yet
    assert!(!store.reset_stale(EMAIL, stale_before).await.unwrap());
    assert_eq!(store.get(EMAIL).await.unwrap().unwrap().count, 3);

    let later = now + Duration::hours(24);
    assert!(store
        .reset_stale(EMAIL, later - Duration::hours(24))
        .await
        .unwrap());
    let record = store.get(EMAIL).await.unwrap().unwrap();
    assert_eq!(record.count, 0);
    assert_eq!(record.last_try, now);

    store.delete(EMAIL).await.unwrap();
    assert!(store.get(EMAIL).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_attempt_store_increment_restarts_stale_window() {
    let pool = setup_db().await;
    let store = SqliteAttemptStore::new(pool);
    let then = Utc::now() - Duration::days(2);

    store
        .upsert(&AttemptRecord::new(EMAIL, 5, then))
        .await
        .unwrap();

    let now = Utc::now();
    let record = store
        .increment(EMAIL, now, now - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(record.count, 1);
    assert_eq!(record.last_try, now);
}

#[tokio::test]
#[serial]
async fn test_attempt_store_prune_stale() {
    let pool = setup_db().await;
    let store = SqliteAttemptStore::new(pool);
    let now = Utc::now();

    store
        .upsert(&AttemptRecord::new("old@example.com", 5, now - Duration::days(2)))
        .await
        .unwrap();
    store
        .upsert(&AttemptRecord::new(EMAIL, 2, now))
        .await
        .unwrap();

    let pruned = store.prune_stale(now - Duration::hours(24)).await.unwrap();
    assert_eq!(pruned, 1);
    assert!(store.get("old@example.com").await.unwrap().is_none());
    assert!(store.get(EMAIL).await.unwrap().is_some());
}

#[tokio::test]
#[serial]
async fn test_tracker_with_sqlite_store() {
    let pool = setup_db().await;
    let tracker = AttemptTracker::new(SqliteAttemptStore::new(pool));
    let now = Utc::now();

    for _ in 0..5 {
        tracker.register_failure(EMAIL, now).await.unwrap();
    }
    assert!(tracker.is_blocked(EMAIL, now).await.unwrap());
    assert!(!tracker
        .is_blocked(EMAIL, now + Duration::hours(24))
        .await
        .unwrap());
}

#[tokio::test]
#[serial]
async fn test_user_and_token_repositories() {
    let pool = setup_db().await;
    let users = SqliteUserRepository::new(pool.clone());
    let tokens = SqliteTokenRepository::with_token_length(pool, 48);

    let user = users.create_user(EMAIL, "hashedpassword123").await.unwrap();
    assert!(user.id > 0);

    let found = users.find_user_by_email(EMAIL).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert!(users
        .find_user_by_email("missing@example.com")
        .await
        .unwrap()
        .is_none());

    let expires_at = Utc::now() + Duration::days(7);
    let token = tokens.create_token(user.id, expires_at).await.unwrap();
    assert_eq!(token.token.expose_secret().len(), 48);

    let found = tokens
        .find_token(token.token.expose_secret())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.user_id, user.id);
    assert!(tokens.find_token("not-a-token").await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_login_gate_with_sqlite() {
    let pool = setup_db().await;
    let hasher = Argon2Hasher::new(1024, 1, 1);
    let users = SqliteUserRepository::new(pool.clone());
    users
        .create_user(EMAIL, &hasher.hash("fake_password").unwrap())
        .await
        .unwrap();

    let attempts = SqliteAttemptStore::new(pool.clone());
    let gate = LoginGate::new(
        PasswordVerifier::with_hasher(users, hasher),
        SqliteTokenRepository::new(pool),
        attempts.clone(),
    );

    let wrong = SecretString::new("wrong_fake_password");
    for _ in 0..5 {
        let result = gate.execute(EMAIL, &wrong).await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
    }

    let right = SecretString::new("fake_password");
    let result = gate.execute(EMAIL, &right).await;
    assert!(matches!(result, Err(AuthError::TooManyAttempts { .. })));

    let mut record = attempts.get(EMAIL).await.unwrap().unwrap();
    record.last_try = Utc::now() - Duration::days(1);
    attempts.upsert(&record).await.unwrap();

    let response = gate.execute(EMAIL, &right).await.unwrap();
    assert_eq!(response.token_type, "bearer");
    assert!(attempts.get(EMAIL).await.unwrap().is_none());
}
