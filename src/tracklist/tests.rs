//! Activation scenarios against recording gateways and a real database.

use std::{collections::HashMap, sync::Arc};

use {async_trait::async_trait, parking_lot::Mutex, tempfile::TempDir};

use crate::{
    error::domain::ControlError,
    library::{LibraryDatabase, LibraryError, PositionStore, models::Track},
    playback::gateway::{PlaybackError, PlaybackGateway, PlayerState, TrackRef},
    tracklist::{RowEvent, RowIndicator, TrackList, TrackListController},
};

/// Call log shared between the mock player and mock store, so tests can
/// assert cross-gateway ordering.
type CallLog = Arc<Mutex<Vec<String>>>;

struct RecordingPlayer {
    current: Mutex<Option<TrackRef>>,
    state: Mutex<PlayerState>,
    log: CallLog,
}

impl RecordingPlayer {
    fn new(log: CallLog) -> Self {
        Self {
            current: Mutex::new(None),
            state: Mutex::new(PlayerState::Stopped),
            log,
        }
    }

    fn with_current(log: CallLog, track: &Track, state: PlayerState) -> Self {
        Self {
            current: Mutex::new(Some(TrackRef::from(track))),
            state: Mutex::new(state),
            log,
        }
    }
}

#[async_trait]
impl PlaybackGateway for RecordingPlayer {
    async fn current_track(&self) -> Option<TrackRef> {
        *self.current.lock()
    }

    async fn state(&self) -> PlayerState {
        *self.state.lock()
    }

    async fn load(&self, track: &Track) -> Result<(), PlaybackError> {
        self.log.lock().push(format!("load({})", track.id));
        *self.current.lock() = Some(TrackRef::from(track));
        *self.state.lock() = PlayerState::Paused;
        Ok(())
    }

    async fn play_pause(&self, resume: bool) -> Result<(), PlaybackError> {
        self.log.lock().push(format!("play_pause({resume})"));
        let mut state = self.state.lock();
        *state = if resume || *state != PlayerState::Playing {
            PlayerState::Playing
        } else {
            PlayerState::Paused
        };
        Ok(())
    }

    async fn seek(&self, position_ns: u64) -> Result<(), PlaybackError> {
        self.log.lock().push(format!("seek({position_ns})"));
        Ok(())
    }
}

struct MemoryStore {
    tracks: HashMap<i64, Track>,
    current: Mutex<HashMap<i64, i64>>,
    log: CallLog,
}

impl MemoryStore {
    fn new(tracks: &[Track], log: CallLog) -> Self {
        Self {
            tracks: tracks.iter().map(|t| (t.id, t.clone())).collect(),
            current: Mutex::new(HashMap::new()),
            log,
        }
    }
}

#[async_trait]
impl PositionStore for MemoryStore {
    async fn find_track(&self, track_id: i64) -> Result<Track, LibraryError> {
        self.log.lock().push(format!("find_track({track_id})"));
        self.tracks
            .get(&track_id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound {
                entity: "track".to_string(),
                id: track_id,
            })
    }

    async fn set_book_current_track(&self, book_id: i64, track_id: i64) -> Result<(), LibraryError> {
        self.log
            .lock()
            .push(format!("set_book_current_track({book_id},{track_id})"));
        self.current.lock().insert(book_id, track_id);
        Ok(())
    }
}

fn track(id: i64, number: i64, position_ns: i64) -> Track {
    Track {
        id,
        book_id: 1,
        number,
        title: format!("Chapter {number}"),
        duration_ms: 600_000,
        position_ns,
        path: format!("/books/test/{number:02}.mp3"),
        ..Track::default()
    }
}

fn controller_over(
    player: RecordingPlayer,
    tracks: &[Track],
    log: &CallLog,
) -> TrackListController<RecordingPlayer, MemoryStore> {
    let store = Arc::new(MemoryStore::new(tracks, log.clone()));
    TrackListController::new(TrackList::new(1, tracks), Arc::new(player), store)
}

#[tokio::test]
async fn test_activating_playing_track_pauses_without_load_or_seek() {
    let log: CallLog = CallLog::default();
    let tracks = [track(10, 1, 0), track(11, 2, 0)];
    let player = RecordingPlayer::with_current(log.clone(), &tracks[0], PlayerState::Playing);
    let mut controller = controller_over(player, &tracks, &log);

    controller.handle_event(10, RowEvent::Activated).await.unwrap();

    assert_eq!(
        *log.lock(),
        vec!["find_track(10)", "play_pause(false)"]
    );
    let row = controller.list().row(10).unwrap();
    assert!(row.selected);
    assert!(!row.playing);
    assert_eq!(row.indicator, RowIndicator::Play);
}

#[tokio::test]
async fn test_activating_paused_track_resumes_at_persisted_position() {
    let log: CallLog = CallLog::default();
    let tracks = [track(10, 1, 42_000_000_000), track(11, 2, 0)];
    let player = RecordingPlayer::with_current(log.clone(), &tracks[0], PlayerState::Paused);
    let mut controller = controller_over(player, &tracks, &log);

    controller.handle_event(10, RowEvent::Activated).await.unwrap();

    assert_eq!(
        *log.lock(),
        vec!["find_track(10)", "play_pause(false)", "seek(42000000000)"]
    );
    let row = controller.list().row(10).unwrap();
    assert!(row.playing);
    assert_eq!(row.indicator, RowIndicator::Pause);
}

#[tokio::test]
async fn test_activating_other_track_loads_plays_then_persists() {
    let log: CallLog = CallLog::default();
    let tracks = [track(10, 1, 0), track(11, 2, 0)];
    let player = RecordingPlayer::with_current(log.clone(), &tracks[0], PlayerState::Playing);
    let mut controller = controller_over(player, &tracks, &log);

    controller.handle_event(11, RowEvent::Activated).await.unwrap();

    // Gateway commands strictly precede the store write
    assert_eq!(
        *log.lock(),
        vec![
            "find_track(11)",
            "load(11)",
            "play_pause(true)",
            "set_book_current_track(1,11)"
        ]
    );
    assert_eq!(controller.list().selected_track(), Some(11));
    assert_eq!(controller.list().current_track(), Some(11));
}

#[tokio::test]
async fn test_activating_deleted_track_mutates_nothing() {
    let log: CallLog = CallLog::default();
    let tracks = [track(10, 1, 0)];
    let player = RecordingPlayer::new(log.clone());
    let store = Arc::new(MemoryStore::new(&tracks, log.clone()));
    let mut controller = TrackListController::new(
        TrackList::new(1, &[track(10, 1, 0), track(99, 2, 0)]),
        Arc::new(player),
        store.clone(),
    );

    let result = controller.handle_event(99, RowEvent::Activated).await;

    assert!(matches!(
        result,
        Err(ControlError::Library(LibraryError::NotFound { .. }))
    ));
    // Only the failed lookup happened; no gateway command, no store write
    assert_eq!(*log.lock(), vec!["find_track(99)"]);
    assert!(store.current.lock().is_empty());
    assert_eq!(controller.list().selected_track(), None);
}

#[tokio::test]
async fn test_activation_moves_selection_between_rows() {
    let log: CallLog = CallLog::default();
    let tracks = [track(10, 1, 0), track(11, 2, 0)];
    let player = RecordingPlayer::new(log.clone());
    let mut controller = controller_over(player, &tracks, &log);

    controller.handle_event(10, RowEvent::Activated).await.unwrap();
    controller.handle_event(11, RowEvent::Activated).await.unwrap();

    let selected: Vec<i64> = controller
        .list()
        .rows()
        .iter()
        .filter(|row| row.selected)
        .map(|row| row.track_id)
        .collect();
    assert_eq!(selected, vec![11]);
    assert!(!controller.list().row(10).unwrap().playing);
}

#[tokio::test]
async fn test_pointer_events_leave_selection_and_playback_alone() {
    let log: CallLog = CallLog::default();
    let tracks = [track(10, 1, 0), track(11, 2, 0)];
    let player = RecordingPlayer::new(log.clone());
    let mut controller = controller_over(player, &tracks, &log);

    controller.handle_event(10, RowEvent::Activated).await.unwrap();
    log.lock().clear();

    controller
        .handle_event(11, RowEvent::PointerEntered)
        .await
        .unwrap();
    assert_eq!(
        controller.list().row(11).unwrap().indicator,
        RowIndicator::Play
    );

    controller
        .handle_event(11, RowEvent::PointerLeft)
        .await
        .unwrap();
    assert_eq!(
        controller.list().row(11).unwrap().indicator,
        RowIndicator::Hidden
    );

    // No gateway or store traffic for pure hover feedback
    assert!(log.lock().is_empty());
    assert_eq!(controller.list().selected_track(), Some(10));
}

#[tokio::test]
async fn test_switch_roundtrip_with_real_database() {
    let dir = TempDir::new().unwrap();
    let database = Arc::new(
        LibraryDatabase::with_database_path(dir.path().join("library.db"))
            .await
            .unwrap(),
    );

    let book_id = database
        .upsert_book("Test Book", None, "/books/test")
        .await
        .unwrap();
    let track_a = database
        .upsert_track(book_id, 1, "Chapter 1", 600_000, "/books/test/01.mp3")
        .await
        .unwrap();
    let track_b = database
        .upsert_track(book_id, 2, "Chapter 2", 600_000, "/books/test/02.mp3")
        .await
        .unwrap();

    let tracks = database.get_tracks_by_book(book_id).await.unwrap();
    let log: CallLog = CallLog::default();
    let player = RecordingPlayer::new(log.clone());
    let mut controller = TrackListController::new(
        TrackList::new(book_id, &tracks),
        Arc::new(player),
        database.clone(),
    );

    controller
        .handle_event(track_a, RowEvent::Activated)
        .await
        .unwrap();
    controller
        .handle_event(track_b, RowEvent::Activated)
        .await
        .unwrap();

    assert_eq!(
        database.get_book_current_track(book_id).await.unwrap(),
        Some(track_b)
    );
}
