//! Migration runner (C1) — plain `.sql` files embedded via `include_str!`,
//! applied in lexical filename order and tracked in `schema_migrations` so
//! re-application is a no-op once a file's checksum matches what's recorded.

use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};

use docforge_domain::error::{Error, Result};

struct Migration {
    filename: &'static str,
    sql: &'static str,
}

/// Lexical filename order matters: later migrations may depend on earlier
/// ones (e.g. the trigger functions in `0002` reference tables from `0001`).
const MIGRATIONS: &[Migration] = &[
    Migration {
        filename: "0001_init.sql",
        sql: include_str!("../migrations/0001_init.sql"),
    },
    Migration {
        filename: "0002_triggers.sql",
        sql: include_str!("../migrations/0002_triggers.sql"),
    },
    Migration {
        filename: "0003_functions.sql",
        sql: include_str!("../migrations/0003_functions.sql"),
    },
];

fn checksum(sql: &str) -> String {
    let digest = Sha256::digest(sql.as_bytes());
    hex::encode(digest)
}

/// Apply every embedded migration against `pool`, skipping any whose
/// checksum already matches a successful `schema_migrations` row.
pub async fn apply(pool: &PgPool) -> Result<()> {
    ensure_ledger_table(pool).await?;

    for migration in MIGRATIONS {
        let checksum = checksum(migration.sql);
        if already_applied(pool, migration.filename, &checksum).await? {
            continue;
        }

        let mut tx = pool.begin().await.map_err(|e| Error::database_with_source("begin migration transaction", e))?;
        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::database_with_source(format!("apply migration {}", migration.filename), e))?;

        sqlx::query(
            "INSERT INTO schema_migrations (filename, checksum, applied_at, success)
             VALUES ($1, $2, now(), true)
             ON CONFLICT (filename) DO UPDATE SET checksum = $2, applied_at = now(), success = true",
        )
        .bind(migration.filename)
        .bind(&checksum)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::database_with_source("record migration", e))?;

        tx.commit().await.map_err(|e| Error::database_with_source("commit migration transaction", e))?;
        tracing::info!(migration = migration.filename, "applied migration");
    }

    Ok(())
}

async fn ensure_ledger_table(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            filename TEXT PRIMARY KEY,
            checksum TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL,
            success BOOLEAN NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| Error::database_with_source("create schema_migrations", e))?;
    Ok(())
}

async fn already_applied(pool: &PgPool, filename: &str, checksum: &str) -> Result<bool> {
    let row = sqlx::query("SELECT checksum, success FROM schema_migrations WHERE filename = $1")
        .bind(filename)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::database_with_source("read schema_migrations", e))?;

    Ok(match row {
        Some(row) => {
            let stored_checksum: String = row.get("checksum");
            let success: bool = row.get("success");
            success && stored_checksum == checksum
        }
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_deterministic() {
        assert_eq!(checksum("select 1"), checksum("select 1"));
        assert_ne!(checksum("select 1"), checksum("select 2"));
    }

    #[test]
    fn migrations_are_listed_in_lexical_order() {
        let names: Vec<&str> = MIGRATIONS.iter().map(|m| m.filename).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
