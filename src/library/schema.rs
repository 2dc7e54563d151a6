//! Database schema definition and versioning for the audiobook library.
//!
//! This module defines the SQLite database schema and provides schema
//! versioning capabilities for future migrations.

use std::path::{Path, PathBuf};

use {
    sqlx::{SqlitePool, sqlite::SqliteConnectOptions},
    thiserror::Error,
};

/// Error type for schema operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),
    /// Schema migration error.
    #[error("Schema migration error: {reason}")]
    MigrationError { reason: String },
}

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Database schema definition.
pub struct SchemaManager {
    pool: SqlitePool,
}

impl SchemaManager {
    /// Creates a new schema manager.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initializes the database schema.
    ///
    /// This method creates all necessary tables and ensures the schema
    /// is at the current version.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if schema initialization fails.
    pub async fn initialize_schema(&self) -> Result<(), SchemaError> {
        // Create schema version table if it doesn't exist
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Check current schema version
        let current_version: Option<i32> =
            sqlx::query_scalar("SELECT version FROM schema_version LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        match current_version {
            None => {
                // Fresh database, create all tables and set version
                self.create_tables().await?;
                sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                    .bind(CURRENT_SCHEMA_VERSION)
                    .execute(&self.pool)
                    .await?;
            }
            Some(version) if version == CURRENT_SCHEMA_VERSION => {
                // Schema is up to date
            }
            Some(version) => {
                return Err(SchemaError::MigrationError {
                    reason: format!("Schema migration from version {} not implemented", version),
                });
            }
        }

        Ok(())
    }

    /// Creates all database tables.
    async fn create_tables(&self) -> Result<(), SchemaError> {
        // Books table
        sqlx::query(
            r#"
            CREATE TABLE books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT,
                path TEXT NOT NULL UNIQUE,
                current_track_id INTEGER REFERENCES tracks (id) ON DELETE SET NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Tracks table
        sqlx::query(
            r#"
            CREATE TABLE tracks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                book_id INTEGER NOT NULL,
                number INTEGER NOT NULL,
                title TEXT NOT NULL,
                duration_ms INTEGER NOT NULL,
                position_ns INTEGER NOT NULL DEFAULT 0,
                path TEXT NOT NULL UNIQUE,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (book_id) REFERENCES books (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Create indexes for performance
        sqlx::query("CREATE INDEX idx_books_title ON books (title)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX idx_books_path ON books (path)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX idx_tracks_book_id ON tracks (book_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX idx_tracks_path ON tracks (path)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Gets the current schema version, or 0 if not initialized.
    pub async fn get_current_version(&self) -> Result<i32, SchemaError> {
        let version: Option<i32> = sqlx::query_scalar("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(version.unwrap_or(0))
    }
}

/// Gets the default database path following XDG Base Directory specification.
#[must_use]
pub fn default_database_path() -> PathBuf {
    let mut config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config_dir.push("lectern");
    config_dir.push("library.db");
    config_dir
}

/// Creates a database connection pool for the given database file.
///
/// # Errors
///
/// Returns `SchemaError` if connection pool creation fails.
pub async fn create_connection_pool<P: AsRef<Path>>(
    database_path: P,
) -> Result<SqlitePool, SchemaError> {
    if let Some(parent) = database_path.as_ref().parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let options = SqliteConnectOptions::new()
        .filename(database_path.as_ref())
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}
