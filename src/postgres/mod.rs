mod attempt;
pub mod migrations;
mod token;
mod user;

pub use attempt::PostgresAttemptStore;
pub use token::PostgresTokenRepository;
pub use user::PostgresUserRepository;

use sqlx::PgPool;

use crate::AuthError;

/// Creates all Postgres repository instances from a connection pool.
pub fn create_repositories(
    pool: PgPool,
) -> (
    PostgresUserRepository,
    PostgresTokenRepository,
    PostgresAttemptStore,
) {
    (
        PostgresUserRepository::new(pool.clone()),
        PostgresTokenRepository::new(pool.clone()),
        PostgresAttemptStore::new(pool),
    )
}

fn database_error(operation: &str, e: &sqlx::Error) -> AuthError {
    log::error!(target: "portcullis", "msg=\"database error\", operation=\"{operation}\", error=\"{e}\"");
    AuthError::DatabaseError(e.to_string())
}
