//! Data models for the audiobook library database.
//!
//! This module defines the core data structures used throughout the library
//! system, the Book and Track records, with proper serde serialization.

use {
    serde::{Deserialize, Serialize},
    sqlx::FromRow,
};

/// Represents an audiobook in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Default)]
pub struct Book {
    /// Unique database ID.
    pub id: i64,
    /// Book title.
    pub title: String,
    /// Author name (if available).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// File system path to the book directory.
    pub path: String,
    /// The track the book should resume from, if one has been chosen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_track_id: Option<i64>,
    /// Timestamp when the book was first added to the library.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Timestamp when the book was last updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Represents one playable chapter or segment of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Track {
    /// Unique database ID.
    pub id: i64,
    /// ID of the owning book.
    pub book_id: i64,
    /// Ordinal number within the book.
    pub number: i64,
    /// Track title.
    pub title: String,
    /// Duration in milliseconds.
    pub duration_ms: i64,
    /// Persisted playback position in nanoseconds.
    pub position_ns: i64,
    /// File system path to the audio file.
    pub path: String,
    /// Timestamp when the track was first added to the library.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Timestamp when the track was last updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            id: 0,
            book_id: 0,
            number: 1,
            title: String::new(),
            duration_ms: 0,
            position_ns: 0,
            path: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{from_str, to_string};

    use crate::library::models::{Book, Track};

    #[test]
    fn test_book_serialization() {
        let book = Book {
            id: 1,
            title: "Test Book".to_string(),
            author: Some("Test Author".to_string()),
            path: "/audiobooks/test-book".to_string(),
            current_track_id: Some(3),
            created_at: Some("2023-01-01 00:00:00".to_string()),
            updated_at: Some("2023-01-02 00:00:00".to_string()),
        };

        let serialized = to_string(&book).unwrap();
        let deserialized: Book = from_str(&serialized).unwrap();
        assert_eq!(book, deserialized);
    }

    #[test]
    fn test_track_serialization() {
        let track = Track {
            id: 1,
            book_id: 1,
            number: 4,
            title: "Chapter 4".to_string(),
            duration_ms: 1_803_000,
            position_ns: 42_000_000_000,
            path: "/audiobooks/test-book/04.m4b".to_string(),
            created_at: Some("2023-01-01 00:00:00".to_string()),
            updated_at: Some("2023-01-02 00:00:00".to_string()),
        };

        let serialized = to_string(&track).unwrap();
        let deserialized: Track = from_str(&serialized).unwrap();
        assert_eq!(track, deserialized);
    }

    #[test]
    fn test_default_implementations() {
        let track = Track::default();
        assert_eq!(track.number, 1);
        assert_eq!(track.position_ns, 0);

        let book = Book::default();
        assert!(book.current_track_id.is_none());
    }
}
