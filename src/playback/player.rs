//! In-process playback gateway backed by rodio.
//!
//! A dedicated audio thread owns the output stream and sink, since the
//! underlying cpal stream cannot move between threads. Commands travel
//! over a channel with per-command reply channels, and a shared state
//! mirror keeps `current_track()`/`state()` reads from ever blocking on
//! the audio thread.

use std::{fs::File, io::BufReader, sync::Arc, thread::Builder, time::Duration};

use {
    async_channel::{Receiver, Sender, bounded, unbounded},
    async_trait::async_trait,
    parking_lot::RwLock,
    rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink},
    tracing::debug,
};

use crate::{
    config::settings::UserSettings,
    library::models::Track,
    playback::gateway::{PlaybackError, PlaybackGateway, PlayerState, TrackRef},
};

/// Output configuration applied to every loaded track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerConfig {
    /// Output volume, where 1.0 is unity gain.
    pub volume: f32,
    /// Playback speed multiplier, where 1.0 is normal speed.
    pub speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            speed: 1.0,
        }
    }
}

impl From<&UserSettings> for PlayerConfig {
    fn from(settings: &UserSettings) -> Self {
        Self {
            volume: settings.volume,
            speed: settings.playback_speed,
        }
    }
}

/// Commands handled by the audio thread.
enum PlayerCommand {
    /// Load a track, replacing any loaded one.
    Load {
        track: Track,
        reply: Sender<Result<(), PlaybackError>>,
    },
    /// Toggle play/pause, or force playback with `resume`.
    PlayPause {
        resume: bool,
        reply: Sender<Result<(), PlaybackError>>,
    },
    /// Seek within the loaded track.
    Seek {
        position: Duration,
        reply: Sender<Result<(), PlaybackError>>,
    },
    /// Report the playback position within the loaded track.
    Position { reply: Sender<Duration> },
    /// Unload the current track.
    Stop { reply: Sender<()> },
}

/// State mirror readable without a round-trip to the audio thread.
#[derive(Default)]
struct SharedState {
    current: Option<TrackRef>,
    state: PlayerState,
}

/// Local playback gateway implementation.
///
/// Commands are serialized through the audio thread, and replies are sent
/// only after the observable state has been updated, so the gateway is
/// immediately consistent as the [`PlaybackGateway`] contract requires.
pub struct LocalPlayer {
    command_tx: Sender<PlayerCommand>,
    shared: Arc<RwLock<SharedState>>,
}

impl LocalPlayer {
    /// Creates a player with default output configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Unavailable`] if no output device can be
    /// opened.
    pub fn new() -> Result<Self, PlaybackError> {
        Self::with_config(PlayerConfig::default())
    }

    /// Creates a player with the given output configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Unavailable`] if no output device can be
    /// opened, or [`PlaybackError::IoError`] if the audio thread cannot
    /// be spawned.
    pub fn with_config(config: PlayerConfig) -> Result<Self, PlaybackError> {
        let (command_tx, command_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded(1);
        let shared = Arc::new(RwLock::new(SharedState::default()));

        let thread_shared = shared.clone();
        Builder::new()
            .name("lectern-audio".to_string())
            .spawn(move || audio_thread(config, command_rx, ready_tx, thread_shared))?;

        match ready_rx.recv_blocking() {
            Ok(result) => result.map(|()| Self { command_tx, shared }),
            Err(_) => Err(PlaybackError::Unavailable {
                reason: "audio thread exited during startup".to_string(),
            }),
        }
    }

    /// The playback position within the loaded track.
    ///
    /// Reports zero when nothing is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Unavailable`] if the audio thread is gone.
    pub async fn position(&self) -> Result<Duration, PlaybackError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(PlayerCommand::Position { reply: reply_tx })
            .await
            .map_err(|_| Self::thread_gone())?;
        reply_rx.recv().await.map_err(|_| Self::thread_gone())
    }

    /// Unloads the current track and returns to the stopped state.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Unavailable`] if the audio thread is gone.
    pub async fn stop(&self) -> Result<(), PlaybackError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(PlayerCommand::Stop { reply: reply_tx })
            .await
            .map_err(|_| Self::thread_gone())?;
        reply_rx.recv().await.map_err(|_| Self::thread_gone())
    }

    fn thread_gone() -> PlaybackError {
        PlaybackError::Unavailable {
            reason: "audio thread terminated".to_string(),
        }
    }
}

#[async_trait]
impl PlaybackGateway for LocalPlayer {
    async fn current_track(&self) -> Option<TrackRef> {
        self.shared.read().current
    }

    async fn state(&self) -> PlayerState {
        self.shared.read().state
    }

    async fn load(&self, track: &Track) -> Result<(), PlaybackError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(PlayerCommand::Load {
                track: track.clone(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| Self::thread_gone())?;
        reply_rx.recv().await.map_err(|_| Self::thread_gone())?
    }

    async fn play_pause(&self, resume: bool) -> Result<(), PlaybackError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(PlayerCommand::PlayPause {
                resume,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Self::thread_gone())?;
        reply_rx.recv().await.map_err(|_| Self::thread_gone())?
    }

    async fn seek(&self, position_ns: u64) -> Result<(), PlaybackError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(PlayerCommand::Seek {
                position: Duration::from_nanos(position_ns),
                reply: reply_tx,
            })
            .await
            .map_err(|_| Self::thread_gone())?;
        reply_rx.recv().await.map_err(|_| Self::thread_gone())?
    }
}

/// Audio thread main loop: owns the output stream and sink.
fn audio_thread(
    config: PlayerConfig,
    command_rx: Receiver<PlayerCommand>,
    ready_tx: Sender<Result<(), PlaybackError>>,
    shared: Arc<RwLock<SharedState>>,
) {
    let mut stream = match OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send_blocking(Err(PlaybackError::Unavailable {
                reason: e.to_string(),
            }));
            return;
        }
    };
    // rodio logs to stderr when the stream is dropped; tracing is the log
    // surface here
    stream.log_on_drop(false);

    if ready_tx.send_blocking(Ok(())).is_err() {
        return;
    }

    let mut sink: Option<Sink> = None;
    while let Ok(command) = command_rx.recv_blocking() {
        match command {
            PlayerCommand::Load { track, reply } => {
                let result = load_track(&stream, &config, &track, &mut sink, &shared);
                let _ = reply.send_blocking(result);
            }
            PlayerCommand::PlayPause { resume, reply } => {
                let result = match sink.as_ref() {
                    None => Err(PlaybackError::NoTrackLoaded),
                    Some(active) => {
                        if resume || active.is_paused() {
                            active.play();
                            shared.write().state = PlayerState::Playing;
                        } else {
                            active.pause();
                            shared.write().state = PlayerState::Paused;
                        }
                        Ok(())
                    }
                };
                let _ = reply.send_blocking(result);
            }
            PlayerCommand::Seek { position, reply } => {
                let result = match sink.as_ref() {
                    None => Err(PlaybackError::NoTrackLoaded),
                    Some(active) => active.try_seek(position).map_err(PlaybackError::from),
                };
                let _ = reply.send_blocking(result);
            }
            PlayerCommand::Position { reply } => {
                let position = sink.as_ref().map_or(Duration::ZERO, Sink::get_pos);
                let _ = reply.send_blocking(position);
            }
            PlayerCommand::Stop { reply } => {
                if let Some(active) = sink.take() {
                    active.stop();
                }
                {
                    let mut state = shared.write();
                    state.current = None;
                    state.state = PlayerState::Stopped;
                }
                let _ = reply.send_blocking(());
            }
        }
    }

    debug!("audio thread exiting");
}

/// Opens and decodes a track into a fresh sink.
///
/// Decode failures leave the previously loaded track untouched.
fn load_track(
    stream: &OutputStream,
    config: &PlayerConfig,
    track: &Track,
    sink: &mut Option<Sink>,
    shared: &Arc<RwLock<SharedState>>,
) -> Result<(), PlaybackError> {
    let file = File::open(&track.path)?;
    let source = Decoder::new(BufReader::new(file))?;

    if let Some(old) = sink.take() {
        old.stop();
    }

    let new_sink = Sink::connect_new(stream.mixer());
    new_sink.set_volume(config.volume);
    new_sink.set_speed(config.speed);
    new_sink.append(source);
    new_sink.pause();
    *sink = Some(new_sink);

    let mut state = shared.write();
    state.current = Some(TrackRef::from(track));
    state.state = PlayerState::Paused;
    debug!(track_id = track.id, path = %track.path, "track loaded");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_config_default() {
        let config = PlayerConfig::default();
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.speed, 1.0);
    }

    #[test]
    fn test_player_config_from_settings() {
        let settings = UserSettings {
            volume: 0.5,
            playback_speed: 1.25,
            ..UserSettings::default()
        };
        let config = PlayerConfig::from(&settings);
        assert_eq!(config.volume, 0.5);
        assert_eq!(config.speed, 1.25);
    }
}
