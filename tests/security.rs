//! Security-focused test suite.
//!
//! Run with: `cargo test --features "mocks jwt" --test security`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use portcullis::actions::LoginGate;
use portcullis::crypto::{Argon2Hasher, PasswordHasher};
use portcullis::{
    AttemptStore, AuthError, MockAttemptStore, MockClock, MockTokenRepository,
    MockUserRepository, PasswordVerifier, SecretString, UserRepository,
};

const EMAIL: &str = "user@example.com";

async fn gate_with_user(
    clock: MockClock,
) -> (
    LoginGate<PasswordVerifier<MockUserRepository, Argon2Hasher>, MockTokenRepository, MockAttemptStore>,
    MockAttemptStore,
) {
    let hasher = Argon2Hasher::new(1024, 1, 1);
    let users = MockUserRepository::new();
    users
        .create_user(EMAIL, &hasher.hash("fake_password").unwrap())
        .await
        .unwrap();

    let attempts = MockAttemptStore::new();
    let gate = LoginGate::new(
        PasswordVerifier::with_hasher(users, hasher),
        MockTokenRepository::new(),
        attempts.clone(),
    )
    .with_clock(clock);

    (gate, attempts)
}

// =============================================================================
// Enumeration
// =============================================================================

#[tokio::test]
async fn unknown_email_and_wrong_password_return_the_same_error() {
    let (gate, _) = gate_with_user(MockClock::default()).await;

    let unknown = gate
        .execute("nobody@example.com", &SecretString::new("fake_password"))
        .await
        .unwrap_err();
    let wrong = gate
        .execute(EMAIL, &SecretString::new("wrong_fake_password"))
        .await
        .unwrap_err();

    assert_eq!(unknown, wrong);
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_eq!(unknown.code(), wrong.code());
}

#[tokio::test]
async fn unknown_identifiers_are_locked_out_too() {
    let (gate, attempts) = gate_with_user(MockClock::default()).await;
    let secret = SecretString::new("fake_password");

    for _ in 0..5 {
        let _ = gate.execute("nobody@example.com", &secret).await;
    }

    let result = gate.execute("nobody@example.com", &secret).await;
    assert!(matches!(result, Err(AuthError::TooManyAttempts { .. })));
    assert_eq!(
        attempts.get("nobody@example.com").await.unwrap().unwrap().count,
        5
    );
}

// =============================================================================
// Lockout
// =============================================================================

#[tokio::test]
async fn lockout_is_not_extended_by_blocked_requests() {
    let clock = MockClock::new(Utc::now());
    let (gate, _) = gate_with_user(clock.clone()).await;
    let wrong = SecretString::new("wrong_fake_password");

    for _ in 0..5 {
        let _ = gate.execute(EMAIL, &wrong).await;
    }

    // hammering during the lockout keeps the original deadline
    for _ in 0..10 {
        clock.advance(Duration::hours(1));
        let _ = gate.execute(EMAIL, &wrong).await;
    }

    clock.advance(Duration::hours(14));
    let response = gate
        .execute(EMAIL, &SecretString::new("fake_password"))
        .await
        .unwrap();
    assert_eq!(response.token_type, "bearer");
}

#[tokio::test]
async fn retry_after_counts_down() {
    let clock = MockClock::new(Utc::now());
    let (gate, _) = gate_with_user(clock.clone()).await;
    let wrong = SecretString::new("wrong_fake_password");

    for _ in 0..5 {
        let _ = gate.execute(EMAIL, &wrong).await;
    }

    clock.advance(Duration::hours(23));
    let err = gate.execute(EMAIL, &wrong).await.unwrap_err();
    assert_eq!(
        err,
        AuthError::TooManyAttempts {
            retry_after: Duration::hours(1).num_seconds(),
            message: "Too many request".to_owned(),
        }
    );
}

#[tokio::test]
async fn storage_failure_never_admits_or_rejects_as_credentials() {
    let (gate, attempts) = gate_with_user(MockClock::default()).await;
    attempts.fail_with_database_error(true);

    for password in ["fake_password", "wrong_fake_password"] {
        let result = gate.execute(EMAIL, &SecretString::new(password)).await;
        assert!(matches!(result, Err(AuthError::DatabaseError(_))));
    }
}

#[tokio::test]
async fn concurrent_failures_match_the_stored_count() {
    let (gate, attempts) = gate_with_user(MockClock::default()).await;
    let wrong = SecretString::new("wrong_fake_password");

    let results = futures::future::join_all((0..20).map(|_| gate.execute(EMAIL, &wrong))).await;

    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(AuthError::InvalidCredentials)))
        .count();
    let blocked = results
        .iter()
        .filter(|r| matches!(r, Err(AuthError::TooManyAttempts { .. })))
        .count();

    assert!(rejected >= 5);
    assert_eq!(rejected + blocked, 20);
    let record = attempts.get(EMAIL).await.unwrap().unwrap();
    assert_eq!(record.count as usize, rejected);
}

// =============================================================================
// Secrets
// =============================================================================

#[test]
fn secrets_are_redacted_in_debug_output() {
    let secret = SecretString::new("fake_password");
    assert!(!format!("{secret:?}").contains("fake_password"));
    assert!(!format!("{secret}").contains("fake_password"));
}

#[test]
fn argon2_produces_different_hashes_for_same_password() {
    let hasher = Argon2Hasher::new(1024, 1, 1);

    let hash1 = hasher.hash("fake_password").unwrap();
    let hash2 = hasher.hash("fake_password").unwrap();
    assert_ne!(hash1, hash2);
    assert!(hasher.verify("fake_password", &hash1).unwrap());
    assert!(hasher.verify("fake_password", &hash2).unwrap());
}

#[cfg(feature = "jwt")]
mod jwt {
    use chrono::{Duration, Utc};
    use portcullis::jwt::{JwtConfig, JwtService, JwtTokenProvider};
    use portcullis::{AuthError, TokenRepository};

    const SECRET: &str = "test-secret-key-that-is-at-least-32-bytes";

    #[test]
    fn short_jwt_secret_is_rejected() {
        assert!(matches!(
            JwtConfig::new("too-short"),
            Err(AuthError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_invalid() {
        let ours = JwtTokenProvider::new(JwtService::new(JwtConfig::new(SECRET).unwrap()));
        let theirs = JwtService::new(
            JwtConfig::new("another-secret-key-that-is-32-bytes-long").unwrap(),
        );

        let forged = theirs.encode(1, Utc::now() + Duration::hours(1)).unwrap();
        assert!(ours.find_token(&forged).await.unwrap().is_none());
    }
}
