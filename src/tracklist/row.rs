//! Presentation state for one track in a book's track list.

use crate::library::models::Track;

/// Icon shown in a row's indicator slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowIndicator {
    /// No icon.
    #[default]
    Hidden,
    /// Play symbol: the row is selected, paused, or hovered while idle.
    Play,
    /// Pause symbol: the row's track is playing.
    Pause,
}

/// Presentation-bound state for one track.
///
/// Rows hold only ids and display fields; the Track and Book records stay
/// owned by the persistence layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRow {
    /// Database ID of the track.
    pub track_id: i64,
    /// Ordinal number within the book.
    pub number: i64,
    /// Track title.
    pub title: String,
    /// Duration in milliseconds.
    pub duration_ms: i64,
    /// Whether this row is the book's selected row.
    pub selected: bool,
    /// Whether this row's track is actively playing.
    pub playing: bool,
    /// Icon currently shown in the indicator slot.
    pub indicator: RowIndicator,
}

impl TrackRow {
    /// Builds a row for a track, with no selection or indicator.
    #[must_use]
    pub fn from_track(track: &Track) -> Self {
        Self {
            track_id: track.id,
            number: track.number,
            title: track.title.clone(),
            duration_ms: track.duration_ms,
            selected: false,
            playing: false,
            indicator: RowIndicator::Hidden,
        }
    }

    /// Formats the duration for display, `H:MM:SS` or `M:SS`.
    #[must_use]
    pub fn duration_text(&self) -> String {
        let total_s = self.duration_ms / 1000;
        let hours = total_s / 3600;
        let minutes = (total_s % 3600) / 60;
        let seconds = total_s % 60;

        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_duration(duration_ms: i64) -> TrackRow {
        TrackRow::from_track(&Track {
            duration_ms,
            ..Track::default()
        })
    }

    #[test]
    fn test_from_track_starts_idle() {
        let track = Track {
            id: 5,
            number: 2,
            title: "Chapter 2".to_string(),
            duration_ms: 90_000,
            ..Track::default()
        };
        let row = TrackRow::from_track(&track);

        assert_eq!(row.track_id, 5);
        assert!(!row.selected);
        assert!(!row.playing);
        assert_eq!(row.indicator, RowIndicator::Hidden);
    }

    #[test]
    fn test_duration_text() {
        assert_eq!(row_with_duration(0).duration_text(), "0:00");
        assert_eq!(row_with_duration(59_000).duration_text(), "0:59");
        assert_eq!(row_with_duration(61_000).duration_text(), "1:01");
        assert_eq!(row_with_duration(3_600_000).duration_text(), "1:00:00");
        assert_eq!(row_with_duration(5_025_000).duration_text(), "1:23:45");
    }
}
