//! Audiobook playback system.
//!
//! Defines the playback gateway contract, the rodio-backed local player,
//! and the activation coordinator that reconciles track selection with
//! the single loaded track.

pub mod coordinator;
pub mod gateway;
pub mod player;

pub use {
    coordinator::{Activation, PlaybackCoordinator},
    gateway::{PlaybackError, PlaybackGateway, PlayerState, TrackRef},
    player::{LocalPlayer, PlayerConfig},
};
