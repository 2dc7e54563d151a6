//! Lectern - Audiobook Playback Core
//!
//! Headless entry point: initializes logging, settings, and the library
//! database, scans the configured library directories, then either lists
//! the library or plays one book until interrupted.

use std::{sync::Arc, time::Duration};

use {
    anyhow::{Context, bail},
    tokio::time::interval,
    tracing::{info, warn},
    tracing_subscriber::EnvFilter,
};

use lectern::{
    LibraryDatabase, LibraryImporter, LocalPlayer, PlaybackGateway, PlayerConfig, RowEvent,
    SettingsManager, TrackList, TrackListController,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings_manager = SettingsManager::new().context("loading settings")?;
    let settings = settings_manager.get_settings().clone();

    let database = Arc::new(
        LibraryDatabase::new()
            .await
            .context("opening library database")?,
    );

    if !settings.library_directories.is_empty() {
        let importer = LibraryImporter::new(database.clone());
        let stats = importer
            .scan_directories(&settings.library_directories)
            .await?;
        info!(
            books = stats.books,
            tracks = stats.tracks,
            skipped = stats.skipped,
            "library scan finished"
        );
    }

    let book_id = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<i64>())
        .transpose()
        .context("BOOK_ID must be an integer")?;

    match book_id {
        None => list_books(&database).await,
        Some(book_id) => play_book(database, PlayerConfig::from(&settings), book_id).await,
    }
}

/// Prints the library, one line per book.
async fn list_books(database: &LibraryDatabase) -> anyhow::Result<()> {
    let books = database.get_books().await?;
    if books.is_empty() {
        println!("No books in the library. Configure library_directories in settings.");
        return Ok(());
    }

    for book in books {
        let tracks = database.get_tracks_by_book(book.id).await?;
        println!("{:>4}  {}  ({} tracks)", book.id, book.title, tracks.len());
    }
    Ok(())
}

/// Plays a book from its current position until Ctrl-C, persisting the
/// playback position as it goes.
async fn play_book(
    database: Arc<LibraryDatabase>,
    config: PlayerConfig,
    book_id: i64,
) -> anyhow::Result<()> {
    let book = database.find_book(book_id).await?;
    let tracks = database.get_tracks_by_book(book_id).await?;
    if tracks.is_empty() {
        bail!("book {book_id} has no tracks");
    }

    let player = Arc::new(LocalPlayer::with_config(config)?);
    let start_track = book.current_track_id.unwrap_or(tracks[0].id);

    let mut controller = TrackListController::new(
        TrackList::new(book_id, &tracks),
        player.clone(),
        database.clone(),
    );
    controller.handle_event(start_track, RowEvent::Activated).await?;
    info!(book = %book.title, track = start_track, "playing, Ctrl-C to stop");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                if let Err(e) = persist_position(&database, &player).await {
                    warn!(error = %e, "failed to persist playback position");
                }
            }
        }
    }

    persist_position(&database, &player)
        .await
        .context("saving final position")?;
    player.stop().await?;
    info!("stopped");
    Ok(())
}

/// Writes the player's position for the loaded track back to the library.
async fn persist_position(
    database: &LibraryDatabase,
    player: &LocalPlayer,
) -> anyhow::Result<()> {
    if let Some(current) = player.current_track().await {
        let position = player.position().await?;
        database
            .update_track_position(current.track_id, position.as_nanos() as i64)
            .await?;
    }
    Ok(())
}
