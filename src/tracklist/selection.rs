//! Per-book selection state for a list of track rows.
//!
//! One `TrackList` exists per open book view and is the sole mutator of
//! row selection, so the at-most-one-selected invariant holds without
//! locking: all row events arrive on one thread of control.

use crate::{
    library::{database::LibraryError, models::Track},
    tracklist::row::{RowIndicator, TrackRow},
};

/// Selection context for one book's track rows.
///
/// Tracks two marks across the rows: the selected row (the book's chosen
/// position) and the current row (the track the playback gateway has
/// loaded). At most one row is selected at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackList {
    book_id: i64,
    rows: Vec<TrackRow>,
    selected: Option<i64>,
    current: Option<i64>,
}

impl TrackList {
    /// Builds the row list for a book's tracks.
    #[must_use]
    pub fn new(book_id: i64, tracks: &[Track]) -> Self {
        Self {
            book_id,
            rows: tracks.iter().map(TrackRow::from_track).collect(),
            selected: None,
            current: None,
        }
    }

    /// The owning book's ID.
    #[must_use]
    pub fn book_id(&self) -> i64 {
        self.book_id
    }

    /// All rows, in reading order.
    #[must_use]
    pub fn rows(&self) -> &[TrackRow] {
        &self.rows
    }

    /// Looks up one row by track ID.
    #[must_use]
    pub fn row(&self, track_id: i64) -> Option<&TrackRow> {
        self.rows.iter().find(|row| row.track_id == track_id)
    }

    /// The selected row's track ID, if any row is selected.
    #[must_use]
    pub fn selected_track(&self) -> Option<i64> {
        self.selected
    }

    /// The current row's track ID, if the gateway has a track loaded.
    #[must_use]
    pub fn current_track(&self) -> Option<i64> {
        self.current
    }

    /// Selects a row as the book's position, deselecting any other row.
    ///
    /// Idempotent when the row is already the sole selected row.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::NotFound`] for a track ID with no row;
    /// the selection state is left unchanged.
    pub fn select(&mut self, track_id: i64) -> Result<(), LibraryError> {
        if self.row(track_id).is_none() {
            return Err(LibraryError::NotFound {
                entity: "track row".to_string(),
                id: track_id,
            });
        }

        if self.selected == Some(track_id) {
            return Ok(());
        }

        if let Some(previous) = self.selected.take() {
            self.clear_row(previous);
        }

        self.selected = Some(track_id);
        if let Some(row) = self.row_mut(track_id) {
            row.selected = true;
            if !row.playing {
                row.indicator = RowIndicator::Play;
            }
        }

        Ok(())
    }

    /// Deselects a row.
    ///
    /// The indicator stays put while the row's track is playing; playback
    /// state overrides the cleared selection.
    pub fn deselect(&mut self, track_id: i64) {
        if self.selected == Some(track_id) {
            self.selected = None;
        }
        self.clear_row(track_id);
    }

    /// Moves the current mark to a row and updates its indicator.
    ///
    /// The previous current row, if different, loses its playing flag and
    /// falls back to its selection indicator.
    pub fn set_playing(&mut self, track_id: i64, playing: bool) {
        if self.row(track_id).is_none() {
            return;
        }

        if let Some(previous) = self.current
            && previous != track_id
            && let Some(row) = self.row_mut(previous)
        {
            row.playing = false;
            row.indicator = if row.selected {
                RowIndicator::Play
            } else {
                RowIndicator::Hidden
            };
        }

        self.current = Some(track_id);
        if let Some(row) = self.row_mut(track_id) {
            row.playing = playing;
            row.indicator = if playing {
                RowIndicator::Pause
            } else {
                RowIndicator::Play
            };
        }
    }

    /// Clears the current mark, e.g. when the gateway stops.
    pub fn clear_playing(&mut self) {
        if let Some(current) = self.current.take()
            && let Some(row) = self.row_mut(current)
        {
            row.playing = false;
            row.indicator = if row.selected {
                RowIndicator::Play
            } else {
                RowIndicator::Hidden
            };
        }
    }

    /// Shows the transient would-start indicator on an idle row.
    ///
    /// Presentation feedback only; selection and playback marks are never
    /// touched.
    pub fn pointer_entered(&mut self, track_id: i64) {
        let is_current = self.current == Some(track_id);
        if let Some(row) = self.row_mut(track_id)
            && !is_current
            && !row.selected
        {
            row.indicator = RowIndicator::Play;
        }
    }

    /// Clears the transient would-start indicator on an idle row.
    pub fn pointer_left(&mut self, track_id: i64) {
        let is_current = self.current == Some(track_id);
        if let Some(row) = self.row_mut(track_id)
            && !is_current
            && !row.selected
        {
            row.indicator = RowIndicator::Hidden;
        }
    }

    fn row_mut(&mut self, track_id: i64) -> Option<&mut TrackRow> {
        self.rows.iter_mut().find(|row| row.track_id == track_id)
    }

    fn clear_row(&mut self, track_id: i64) {
        if let Some(row) = self.row_mut(track_id) {
            row.selected = false;
            if !row.playing {
                row.indicator = RowIndicator::Hidden;
            }
        }
    }
}
