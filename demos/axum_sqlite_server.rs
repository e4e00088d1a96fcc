#![allow(clippy::print_stdout, clippy::expect_used)]

//! Axum SQLite login server with brute-force protection.
//!
//! Run with: `cargo run --example axum_sqlite_server --features "axum_api sqlx_sqlite"`
//!
//! Environment variables:
//!   DATABASE_URL=sqlite:./portcullis.db (optional, defaults to in-memory)
//!
//! A demo account `user@example.com` / `fake_password` is created on start.
//! Six wrong passwords in a row get a 429:
//!   curl -i -X POST http://localhost:8080/api/v1/auth/login \
//!     -H "Content-Type: application/json" \
//!     -d '{"email": "user@example.com", "password": "wrong"}'

use axum::Router;
use portcullis::api::axum::{login_routes, AppState};
use portcullis::crypto::{Argon2Hasher, PasswordHasher};
use portcullis::sqlite::{
    create_repositories, migrations, SqliteAttemptStore, SqliteTokenRepository,
    SqliteUserRepository,
};
use portcullis::{PasswordVerifier, PortcullisConfig, UserRepository};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;

const DEMO_EMAIL: &str = "user@example.com";

#[tokio::main]
async fn main() {
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_owned());

    // every in-memory connection is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to create pool");

    migrations::run(&pool)
        .await
        .expect("Failed to run migrations");

    let (users, token_repo, attempt_store) = create_repositories(pool);

    if users
        .find_user_by_email(DEMO_EMAIL)
        .await
        .expect("Failed to look up demo user")
        .is_none()
    {
        let hash = Argon2Hasher::production()
            .hash("fake_password")
            .expect("Failed to hash demo password");
        users
            .create_user(DEMO_EMAIL, &hash)
            .await
            .expect("Failed to create demo user");
    }

    let state = AppState {
        verifier: PasswordVerifier::with_hasher(users, Argon2Hasher::production()),
        token_repo,
        attempt_store,
        config: PortcullisConfig::default(),
    };

    let app = Router::new()
        .nest(
            "/api/v1/auth",
            login_routes::<
                PasswordVerifier<SqliteUserRepository>,
                SqliteTokenRepository,
                SqliteAttemptStore,
            >(),
        )
        .with_state(state);

    println!("Starting portcullis demo on http://localhost:8080");
    println!("Database: {database_url}");
    println!("  POST /api/v1/auth/login - Login (5 failures lock the account for 24h)");

    let listener = TcpListener::bind("127.0.0.1:8080")
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}
