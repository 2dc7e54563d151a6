//! Playback gateway contract consumed by the track list.
//!
//! The gateway reports the currently loaded track and playback state and
//! accepts load, play/pause, and seek commands. Implementations must be
//! immediately consistent: a command updates the observable state before
//! its future resolves.

use {async_trait::async_trait, serde::{Deserialize, Serialize}, thiserror::Error};

use crate::library::models::Track;

/// Error type for playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The gateway cannot be reached or initialized.
    #[error("Playback gateway unavailable: {reason}")]
    Unavailable { reason: String },
    /// The audio file could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(#[from] rodio::decoder::DecoderError),
    /// Seeking within the loaded track failed.
    #[error("Seek error: {0}")]
    SeekError(#[from] rodio::source::SeekError),
    /// The audio file could not be opened.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid operation for current state.
    #[error("Invalid operation: {reason}")]
    InvalidOperation { reason: String },
    /// Track not found or not loaded.
    #[error("No track loaded")]
    NoTrackLoaded,
}

/// Current playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    /// No track is loaded.
    #[default]
    Stopped,
    /// Track is currently playing.
    Playing,
    /// Track is loaded but paused.
    Paused,
}

/// Identifies the track a gateway currently has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackRef {
    /// Database ID of the track.
    pub track_id: i64,
    /// Database ID of the owning book.
    pub book_id: i64,
}

impl From<&Track> for TrackRef {
    fn from(track: &Track) -> Self {
        Self {
            track_id: track.id,
            book_id: track.book_id,
        }
    }
}

/// Playback interface consumed by track activation.
///
/// [`LocalPlayer`](crate::playback::LocalPlayer) is the production
/// implementation; tests substitute recording mocks.
#[async_trait]
pub trait PlaybackGateway: Send + Sync {
    /// The track currently loaded, if any.
    async fn current_track(&self) -> Option<TrackRef>;

    /// The current playback state.
    async fn state(&self) -> PlayerState;

    /// Loads a track for playback, replacing any loaded track.
    ///
    /// The loaded track starts out paused.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError`] if the file cannot be opened or decoded;
    /// the previously loaded track stays untouched.
    async fn load(&self, track: &Track) -> Result<(), PlaybackError>;

    /// Toggles between playing and paused.
    ///
    /// With `resume` set, playback always ends up running, never paused.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::NoTrackLoaded`] if nothing is loaded.
    async fn play_pause(&self, resume: bool) -> Result<(), PlaybackError>;

    /// Seeks within the loaded track.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError`] if nothing is loaded or the source
    /// cannot seek.
    async fn seek(&self, position_ns: u64) -> Result<(), PlaybackError>;
}
