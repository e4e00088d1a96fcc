//! Embedded `SQLite` migrations.
//!
//! ```rust,ignore
//! use portcullis::sqlite::migrations;
//! use sqlx::SqlitePool;
//!
//! async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::{Executor, SqlitePool};

/// Users and access tokens.
const CORE_MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250101000001_create_users_table",
        include_str!("../../migrations_sqlite/core/20250101000001_create_users_table.sql"),
    ),
    (
        "20250101000002_create_access_tokens_table",
        include_str!("../../migrations_sqlite/core/20250101000002_create_access_tokens_table.sql"),
    ),
];

/// Failed-login counters.
const THROTTLE_MIGRATIONS: &[(&str, &str)] = &[(
    "20250101000003_create_login_attempts_table",
    include_str!(
        "../../migrations_sqlite/throttle/20250101000003_create_login_attempts_table.sql"
    ),
)];

/// Runs all migrations not applied yet.
///
/// Applied migrations are tracked by name in `_portcullis_migrations`.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _portcullis_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    run_migrations(pool, CORE_MIGRATIONS).await?;
    run_migrations(pool, THROTTLE_MIGRATIONS).await?;

    Ok(())
}

/// Statements are split on `;`, so migrations must not put one inside a string literal.
async fn run_migrations(pool: &SqlitePool, migrations: &[(&str, &str)]) -> Result<(), sqlx::Error> {
    for (name, sql) in migrations {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _portcullis_migrations WHERE name = ?)")
                .bind(*name)
                .fetch_one(pool)
                .await?;

        if applied {
            continue;
        }

        for statement in sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                pool.execute(trimmed).await?;
            }
        }

        sqlx::query("INSERT INTO _portcullis_migrations (name) VALUES (?)")
            .bind(*name)
            .execute(pool)
            .await?;

        log::info!(target: "portcullis", "msg=\"migration applied\", name=\"{name}\"");
    }
    Ok(())
}
