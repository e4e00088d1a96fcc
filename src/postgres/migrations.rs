//! Database migrations.
//!
//! The core and throttle sets share one `_sqlx_migrations` table, so each
//! migrator ignores versions applied by the other.
//!
//! ```rust,ignore
//! use portcullis::postgres::migrations;
//! use sqlx::PgPool;
//!
//! async fn setup_database(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//!     migrations::run(pool).await
//! }
//! ```

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;

/// Creates `users` and `access_tokens`.
///
/// Only needed when the crate's own user and token repositories are used.
pub async fn run_core(pool: &PgPool) -> Result<(), MigrateError> {
    let mut migrator: Migrator = sqlx::migrate!("./migrations/core");
    migrator.set_ignore_missing(true).run(pool).await
}

/// Creates `login_attempts`.
pub async fn run_throttle(pool: &PgPool) -> Result<(), MigrateError> {
    let mut migrator: Migrator = sqlx::migrate!("./migrations/throttle");
    migrator.set_ignore_missing(true).run(pool).await
}

/// Runs every migration, core first.
pub async fn run(pool: &PgPool) -> Result<(), MigrateError> {
    run_core(pool).await?;
    run_throttle(pool).await
}
