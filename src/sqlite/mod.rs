//! `SQLite` database backend implementations.
//!
//! Suitable for single-instance deployments or testing. Enable the
//! `sqlx_sqlite` feature to use these implementations.

mod attempt;
pub mod migrations;
mod token;
mod user;

pub use attempt::SqliteAttemptStore;
use sqlx::SqlitePool;
pub use token::SqliteTokenRepository;
pub use user::SqliteUserRepository;

use crate::AuthError;

/// Creates all `SQLite` repository instances from a connection pool.
pub fn create_repositories(
    pool: SqlitePool,
) -> (SqliteUserRepository, SqliteTokenRepository, SqliteAttemptStore) {
    (
        SqliteUserRepository::new(pool.clone()),
        SqliteTokenRepository::new(pool.clone()),
        SqliteAttemptStore::new(pool),
    )
}

fn database_error(operation: &str, e: &sqlx::Error) -> AuthError {
    log::error!(target: "portcullis", "msg=\"database error\", operation=\"{operation}\", error=\"{e}\"");
    AuthError::DatabaseError(e.to_string())
}
