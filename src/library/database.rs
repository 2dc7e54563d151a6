//! Library database interface using sqlx with SQLite.
//!
//! This module provides the main `LibraryDatabase` struct that handles
//! all database operations for the audiobook library: book and track
//! queries, current-position bookkeeping, and importer upserts.

use std::path::Path;

use {sqlx::SqlitePool, thiserror::Error};

use crate::library::{
    PositionStore,
    models::{Book, Track},
    schema::{SchemaManager, create_connection_pool, default_database_path},
};

/// Error type for library database operations.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    /// Schema initialization error.
    #[error("Schema error: {0}")]
    SchemaError(#[from] crate::library::schema::SchemaError),
    /// Invalid file path or metadata.
    #[error("Invalid data: {reason}")]
    InvalidData { reason: String },
    /// Record not found.
    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: i64 },
}

/// Main library database interface.
///
/// The `LibraryDatabase` provides async methods for all library operations
/// and implements [`PositionStore`] for the playback layer.
pub struct LibraryDatabase {
    pool: SqlitePool,
}

impl LibraryDatabase {
    /// Creates a new library database instance at the default XDG location.
    ///
    /// This method initializes the database connection pool and ensures
    /// the schema is properly set up.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if database initialization fails.
    pub async fn new() -> Result<Self, LibraryError> {
        Self::with_database_path(default_database_path()).await
    }

    /// Creates a new library database instance at a custom path.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if database initialization fails.
    pub async fn with_database_path<P: AsRef<Path>>(path: P) -> Result<Self, LibraryError> {
        let pool = create_connection_pool(path).await?;
        let schema_manager = SchemaManager::new(pool.clone());
        schema_manager.initialize_schema().await?;

        Ok(LibraryDatabase { pool })
    }

    /// Gets all books in the library, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if the query fails.
    pub async fn get_books(&self) -> Result<Vec<Book>, LibraryError> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, path, current_track_id, created_at, updated_at
            FROM books
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Gets a single book by ID.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NotFound` if the book doesn't exist.
    pub async fn find_book(&self, book_id: i64) -> Result<Book, LibraryError> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, path, current_track_id, created_at, updated_at
            FROM books
            WHERE id = ?
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        book.ok_or_else(|| LibraryError::NotFound {
            entity: "book".to_string(),
            id: book_id,
        })
    }

    /// Gets a single track by ID.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NotFound` if the track doesn't exist.
    pub async fn get_track(&self, track_id: i64) -> Result<Track, LibraryError> {
        let track = sqlx::query_as::<_, Track>(
            r#"
            SELECT id, book_id, number, title, duration_ms, position_ns, path,
                   created_at, updated_at
            FROM tracks
            WHERE id = ?
            "#,
        )
        .bind(track_id)
        .fetch_optional(&self.pool)
        .await?;

        track.ok_or_else(|| LibraryError::NotFound {
            entity: "track".to_string(),
            id: track_id,
        })
    }

    /// Gets all tracks for a specific book, in reading order.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if the query fails or the book doesn't exist.
    pub async fn get_tracks_by_book(&self, book_id: i64) -> Result<Vec<Track>, LibraryError> {
        // Verify book exists
        let book_exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;

        if book_exists.is_none() {
            return Err(LibraryError::NotFound {
                entity: "book".to_string(),
                id: book_id,
            });
        }

        let tracks = sqlx::query_as::<_, Track>(
            r#"
            SELECT id, book_id, number, title, duration_ms, position_ns, path,
                   created_at, updated_at
            FROM tracks
            WHERE book_id = ?
            ORDER BY number, title
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tracks)
    }

    /// Sets the track a book should resume from.
    ///
    /// The track must exist and belong to the given book.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NotFound` if the track or book doesn't exist,
    /// or `LibraryError::InvalidData` if the track belongs to another book.
    pub async fn update_book_current_track(
        &self,
        book_id: i64,
        track_id: i64,
    ) -> Result<(), LibraryError> {
        let track = self.get_track(track_id).await?;
        if track.book_id != book_id {
            return Err(LibraryError::InvalidData {
                reason: format!(
                    "track {} belongs to book {}, not book {}",
                    track_id, track.book_id, book_id
                ),
            });
        }

        let result = sqlx::query(
            "UPDATE books SET current_track_id = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(track_id)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::NotFound {
                entity: "book".to_string(),
                id: book_id,
            });
        }

        Ok(())
    }

    /// Gets the track a book should resume from, if one has been chosen.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NotFound` if the book doesn't exist.
    pub async fn get_book_current_track(&self, book_id: i64) -> Result<Option<i64>, LibraryError> {
        Ok(self.find_book(book_id).await?.current_track_id)
    }

    /// Updates the persisted playback position of a track.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NotFound` if the track doesn't exist.
    pub async fn update_track_position(
        &self,
        track_id: i64,
        position_ns: i64,
    ) -> Result<(), LibraryError> {
        let result = sqlx::query(
            "UPDATE tracks SET position_ns = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(position_ns)
        .bind(track_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::NotFound {
                entity: "track".to_string(),
                id: track_id,
            });
        }

        Ok(())
    }

    /// Inserts a book, or updates an existing book with the same path.
    ///
    /// # Returns
    ///
    /// The database ID of the book.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if the statement fails.
    pub async fn upsert_book(
        &self,
        title: &str,
        author: Option<&str>,
        path: &str,
    ) -> Result<i64, LibraryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, path)
            VALUES (?, ?, ?)
            ON CONFLICT (path) DO UPDATE SET
                title = excluded.title,
                author = excluded.author,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(path)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Inserts a track, or updates an existing track with the same path.
    ///
    /// A re-imported track keeps its persisted playback position.
    ///
    /// # Returns
    ///
    /// The database ID of the track.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if the statement fails.
    pub async fn upsert_track(
        &self,
        book_id: i64,
        number: i64,
        title: &str,
        duration_ms: i64,
        path: &str,
    ) -> Result<i64, LibraryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tracks (book_id, number, title, duration_ms, path)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (path) DO UPDATE SET
                book_id = excluded.book_id,
                number = excluded.number,
                title = excluded.title,
                duration_ms = excluded.duration_ms,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(book_id)
        .bind(number)
        .bind(title)
        .bind(duration_ms)
        .bind(path)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Gets the database connection pool for advanced operations.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl PositionStore for LibraryDatabase {
    async fn find_track(&self, track_id: i64) -> Result<Track, LibraryError> {
        self.get_track(track_id).await
    }

    async fn set_book_current_track(&self, book_id: i64, track_id: i64) -> Result<(), LibraryError> {
        self.update_book_current_track(book_id, track_id).await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn test_database() -> (TempDir, LibraryDatabase) {
        let dir = TempDir::new().unwrap();
        let database = LibraryDatabase::with_database_path(dir.path().join("library.db"))
            .await
            .unwrap();
        (dir, database)
    }

    #[test]
    fn test_library_error_display() {
        let not_found_error = LibraryError::NotFound {
            entity: "track".to_string(),
            id: 123,
        };
        assert_eq!(
            not_found_error.to_string(),
            "Record not found: track with id 123"
        );

        let invalid_data_error = LibraryError::InvalidData {
            reason: "test reason".to_string(),
        };
        assert_eq!(invalid_data_error.to_string(), "Invalid data: test reason");
    }

    #[tokio::test]
    async fn test_find_track_not_found() {
        let (_dir, database) = test_database().await;

        let result = database.get_track(42).await;
        assert!(matches!(
            result,
            Err(LibraryError::NotFound { ref entity, id: 42 }) if entity == "track"
        ));
    }

    #[tokio::test]
    async fn test_tracks_ordered_by_number() {
        let (_dir, database) = test_database().await;

        let book_id = database
            .upsert_book("Test Book", Some("Author"), "/books/test")
            .await
            .unwrap();
        database
            .upsert_track(book_id, 2, "Chapter 2", 1_000, "/books/test/02.mp3")
            .await
            .unwrap();
        database
            .upsert_track(book_id, 1, "Chapter 1", 1_000, "/books/test/01.mp3")
            .await
            .unwrap();

        let tracks = database.get_tracks_by_book(book_id).await.unwrap();
        let numbers: Vec<i64> = tracks.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_tracks_for_missing_book() {
        let (_dir, database) = test_database().await;

        let result = database.get_tracks_by_book(7).await;
        assert!(matches!(result, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_current_track_roundtrip() {
        let (_dir, database) = test_database().await;

        let book_id = database
            .upsert_book("Test Book", None, "/books/test")
            .await
            .unwrap();
        let track_id = database
            .upsert_track(book_id, 1, "Chapter 1", 1_000, "/books/test/01.mp3")
            .await
            .unwrap();

        assert_eq!(database.get_book_current_track(book_id).await.unwrap(), None);

        database
            .update_book_current_track(book_id, track_id)
            .await
            .unwrap();
        assert_eq!(
            database.get_book_current_track(book_id).await.unwrap(),
            Some(track_id)
        );
    }

    #[tokio::test]
    async fn test_current_track_rejects_other_book() {
        let (_dir, database) = test_database().await;

        let book_a = database
            .upsert_book("Book A", None, "/books/a")
            .await
            .unwrap();
        let book_b = database
            .upsert_book("Book B", None, "/books/b")
            .await
            .unwrap();
        let track_b = database
            .upsert_track(book_b, 1, "Chapter 1", 1_000, "/books/b/01.mp3")
            .await
            .unwrap();

        let result = database.update_book_current_track(book_a, track_b).await;
        assert!(matches!(result, Err(LibraryError::InvalidData { .. })));
        assert_eq!(database.get_book_current_track(book_a).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_track_position() {
        let (_dir, database) = test_database().await;

        let book_id = database
            .upsert_book("Test Book", None, "/books/test")
            .await
            .unwrap();
        let track_id = database
            .upsert_track(book_id, 1, "Chapter 1", 1_000, "/books/test/01.mp3")
            .await
            .unwrap();

        database
            .update_track_position(track_id, 5_000_000_000)
            .await
            .unwrap();
        let track = database.get_track(track_id).await.unwrap();
        assert_eq!(track.position_ns, 5_000_000_000);

        let result = database.update_track_position(99, 1).await;
        assert!(matches!(result, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reimport_preserves_position() {
        let (_dir, database) = test_database().await;

        let book_id = database
            .upsert_book("Test Book", None, "/books/test")
            .await
            .unwrap();
        let track_id = database
            .upsert_track(book_id, 1, "Chapter 1", 1_000, "/books/test/01.mp3")
            .await
            .unwrap();
        database
            .update_track_position(track_id, 9_000_000_000)
            .await
            .unwrap();

        // Same path, updated metadata
        let reimported = database
            .upsert_track(book_id, 1, "Chapter One", 2_000, "/books/test/01.mp3")
            .await
            .unwrap();
        assert_eq!(reimported, track_id);

        let track = database.get_track(track_id).await.unwrap();
        assert_eq!(track.title, "Chapter One");
        assert_eq!(track.position_ns, 9_000_000_000);
    }
}
