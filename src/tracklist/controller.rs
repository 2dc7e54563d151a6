//! Row-event dispatch for a book's track list.
//!
//! The controller is the seam between a frontend's event wiring and the
//! playback core: the frontend maps its toolkit callbacks onto
//! [`RowEvent`]s, and the controller runs activation through the
//! [`PlaybackCoordinator`] and keeps the row marks consistent.

use std::sync::Arc;

use crate::{
    error::domain::ControlError,
    library::PositionStore,
    playback::{
        coordinator::{Activation, PlaybackCoordinator},
        gateway::{PlaybackGateway, PlayerState},
    },
    tracklist::selection::TrackList,
};

/// Abstract row events, independent of any UI toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEvent {
    /// The row was clicked or otherwise activated.
    Activated,
    /// The pointer entered the row.
    PointerEntered,
    /// The pointer left the row.
    PointerLeft,
}

/// Drives one book's track list against the playback layer.
pub struct TrackListController<P, S> {
    list: TrackList,
    coordinator: PlaybackCoordinator<P, S>,
}

impl<P: PlaybackGateway, S: PositionStore> TrackListController<P, S> {
    /// Creates a controller for a book's rows over the given gateway and
    /// store.
    pub fn new(list: TrackList, player: Arc<P>, store: Arc<S>) -> Self {
        Self {
            list,
            coordinator: PlaybackCoordinator::new(player, store),
        }
    }

    /// The current row state, for rendering.
    pub fn list(&self) -> &TrackList {
        &self.list
    }

    /// Handles one row event.
    ///
    /// Pointer events only ever touch transient indicators. Activation
    /// reconciles playback first and updates the row marks only once the
    /// gateway and store have accepted the commands, so a failure leaves
    /// the list exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError`] when activation fails; pointer events are
    /// infallible.
    pub async fn handle_event(&mut self, track_id: i64, event: RowEvent) -> Result<(), ControlError> {
        match event {
            RowEvent::Activated => self.activate(track_id).await,
            RowEvent::PointerEntered => {
                self.list.pointer_entered(track_id);
                Ok(())
            }
            RowEvent::PointerLeft => {
                self.list.pointer_left(track_id);
                Ok(())
            }
        }
    }

    async fn activate(&mut self, track_id: i64) -> Result<(), ControlError> {
        let activation = self.coordinator.activate_track(track_id).await?;
        self.list.select(track_id)?;
        match activation {
            Activation::Toggled { state } => self
                .list
                .set_playing(track_id, state == PlayerState::Playing),
            Activation::Switched => self.list.set_playing(track_id, true),
        }
        Ok(())
    }
}
