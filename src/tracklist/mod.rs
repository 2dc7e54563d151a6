//! Track list presentation core.
//!
//! Per-book row state and the event dispatch that connects a frontend's
//! row widgets to the playback layer. The toolkit side (layout, styling,
//! icon rendering, event wiring) lives entirely outside this crate.

pub mod controller;
pub mod row;
pub mod selection;

#[cfg(test)]
mod tests;

pub use {
    controller::{RowEvent, TrackListController},
    row::{RowIndicator, TrackRow},
    selection::TrackList,
};
