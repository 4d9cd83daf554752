//! Uniqueness store backed by SQLite.

use crate::error::{Error, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Handle to the durable uniqueness store.
///
/// Opened on an explicit database path; never an ambient singleton. The
/// store only grows: a failed assertion leaves it untouched, and there
/// is no delete operation.
pub struct UniquenessStore {
    pool: SqlitePool,
}

impl UniquenessStore {
    /// Opens the store at the given database path, creating the file
    /// and schema if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection or schema creation
    /// fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Creates an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection or schema creation
    /// fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS unique_strings (
                namespace TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (namespace, value)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records the value under the namespace, failing if it was already
    /// recorded.
    ///
    /// Check and insert are one atomic statement; two racing calls for
    /// the same pair are serialized by the storage layer, and exactly
    /// one succeeds. A failed assertion does not change durable state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Duplicate`] if the pair already exists, or a
    /// database error if the insert fails for another reason.
    pub async fn assert_unique(&self, value: &str, namespace: &str) -> Result<()> {
        let result = sqlx::query("INSERT INTO unique_strings (namespace, value) VALUES (?, ?)")
            .bind(namespace)
            .bind(value)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(namespace = %namespace, "value recorded as unique");
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(Error::Duplicate {
                    value: value.to_string(),
                    namespace: namespace.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}
