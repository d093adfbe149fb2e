//! `SQLite` backend for the string-keyed document store.
//!
//! Every document lives in one row of `kv_items`; the JSON stores above decide
//! what goes in the value.

use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{KeyValueStore, Storage};

mod kv_repo;
mod migrate;

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Applied to each pooled connection as it opens.
const CONNECTION_PRAGMAS: [&str; 2] = [
    "PRAGMA journal_mode = WAL;",
    "PRAGMA busy_timeout = 5000;",
];

/// Key/value rows in a pooled `SQLite` database.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Open a pool against `database_url` without touching the schema.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or a
    /// connection pragma is rejected.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    for pragma in CONNECTION_PRAGMAS {
                        sqlx::query(pragma).execute(&mut *conn).await?;
                    }
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Connect and bring `kv_items` up to the current schema version.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` from either step.
    pub async fn open(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply pending schema versions; already applied ones are skipped.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration statement fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// All four documents stored in the `SQLite` database at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::open(database_url).await?;
        let backend: Arc<dyn KeyValueStore> = Arc::new(repo);
        Ok(Self::from_backend(backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }

    #[tokio::test]
    async fn connections_carry_busy_timeout() {
        let repo = SqliteRepository::open("sqlite:file:memdb_pragmas?mode=memory&cache=shared")
            .await
            .unwrap();
        let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(timeout, 5000);
        assert_eq!(repo.get_item("missing").await.unwrap(), None);
    }
}
