//! Lectern - Audiobook Playback Core
//!
//! A headless audiobook-player core: per-book track selection, playback
//! reconciliation against a pluggable gateway, and SQLite-backed position
//! bookkeeping. Frontends supply the widgets and event wiring; this crate
//! supplies the behavior behind them.

pub mod config;
pub mod error;
pub mod library;
pub mod playback;
pub mod tracklist;

// Re-export key types for convenience
pub use {
    config::{SettingsManager, UserSettings},
    error::{ControlError, ErrorReporter, ResultExt},
    library::{Book, ImportStats, LibraryDatabase, LibraryError, LibraryImporter, PositionStore, Track},
    playback::{
        Activation, LocalPlayer, PlaybackCoordinator, PlaybackError, PlaybackGateway, PlayerConfig,
        PlayerState, TrackRef,
    },
    tracklist::{RowEvent, RowIndicator, TrackList, TrackListController, TrackRow},
};
