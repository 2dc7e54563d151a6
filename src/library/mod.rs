//! Audiobook library management system.
//!
//! This module provides the foundation for managing an audiobook library,
//! including database operations, data models, schema management, and the
//! directory importer.

use async_trait::async_trait;

pub mod database;
pub mod importer;
pub mod models;
pub mod schema;

pub use {
    database::{LibraryDatabase, LibraryError},
    importer::{ImportStats, LibraryImporter},
    models::{Book, Track},
    schema::{CURRENT_SCHEMA_VERSION, SchemaManager, create_connection_pool, default_database_path},
};

/// Persistence interface consumed by the playback layer.
///
/// Implementations store which track is a book's current position. The
/// library database is the production implementation; tests substitute
/// in-memory recorders.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Looks up a track record by ID.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::NotFound`] if no such track exists.
    async fn find_track(&self, track_id: i64) -> Result<Track, LibraryError>;

    /// Records the track a book should resume from.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError`] if the book or track is missing or the
    /// write fails.
    async fn set_book_current_track(&self, book_id: i64, track_id: i64)
    -> Result<(), LibraryError>;
}
