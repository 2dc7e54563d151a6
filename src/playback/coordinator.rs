//! Track activation against the playback gateway and position store.
//!
//! This is the reconciliation between a track list and the single loaded
//! track: activating the loaded track toggles play/pause, activating any
//! other track switches playback to it and records it as the book's
//! current position.

use std::sync::Arc;

use tracing::debug;

use crate::{
    error::domain::ControlError,
    library::PositionStore,
    playback::gateway::{PlaybackGateway, PlayerState},
};

/// What an activation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The activated track was already loaded; play/pause was toggled.
    Toggled {
        /// Playback state after the toggle.
        state: PlayerState,
    },
    /// Playback switched to the activated track.
    Switched,
}

/// Reconciles track activation with the playback gateway and the store.
pub struct PlaybackCoordinator<P, S> {
    player: Arc<P>,
    store: Arc<S>,
}

impl<P: PlaybackGateway, S: PositionStore> PlaybackCoordinator<P, S> {
    /// Creates a coordinator over the given gateway and store.
    pub fn new(player: Arc<P>, store: Arc<S>) -> Self {
        Self { player, store }
    }

    /// Activates a track.
    ///
    /// If the track is the gateway's current track, play/pause is toggled
    /// and, when the toggle lands on playing, the gateway seeks to the
    /// track's persisted position. Otherwise the track is loaded, started,
    /// and recorded as its book's current position, strictly in that
    /// order: a crash between the gateway commands and the store write
    /// leaves playback correct and bookkeeping stale, which the next
    /// activation repairs.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError`] if the track is missing from the store or
    /// a gateway command fails. The store lookup happens before any
    /// command, so a missing track mutates neither gateway nor store.
    pub async fn activate_track(&self, track_id: i64) -> Result<Activation, ControlError> {
        let track = self.store.find_track(track_id).await?;

        let current = self.player.current_track().await;
        if current.is_some_and(|loaded| loaded.track_id == track.id) {
            self.player.play_pause(false).await?;
            let state = self.player.state().await;
            if state == PlayerState::Playing {
                // Resume exactly where the listener left off
                self.player.seek(track.position_ns.max(0) as u64).await?;
            }
            debug!(track_id, ?state, "toggled current track");
            Ok(Activation::Toggled { state })
        } else {
            self.player.load(&track).await?;
            self.player.play_pause(true).await?;
            self.store
                .set_book_current_track(track.book_id, track.id)
                .await?;
            debug!(track_id, book_id = track.book_id, "switched playback");
            Ok(Activation::Switched)
        }
    }
}
