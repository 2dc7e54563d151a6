//! Domain-specific error types using `thiserror`.
//!
//! The library and playback modules each define their own error enums;
//! this module defines the union surfaced by operations that touch both
//! sides, such as track activation.

use thiserror::Error;

use crate::{library::database::LibraryError, playback::gateway::PlaybackError};

/// Errors surfaced by track activation and other control operations.
///
/// A failed operation leaves selection, gateway, and store state
/// unchanged; re-activating the row retries it.
#[derive(Error, Debug)]
pub enum ControlError {
    /// Persistence lookup or write error.
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
    /// Playback gateway command error.
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),
}
