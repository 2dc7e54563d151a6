//! Directory importer for audiobook folders.
//!
//! This module walks the configured library directories, groups audio files
//! by their containing directory into books, extracts tags and durations
//! with `lofty`, and upserts the records into the library database.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    lofty::{
        error::LoftyError,
        prelude::{AudioFile, TaggedFileExt},
        probe::Probe,
        tag::Accessor,
    },
    tracing::{debug, warn},
    walkdir::WalkDir,
};

use crate::library::database::{LibraryDatabase, LibraryError};

/// File extensions treated as audiobook audio.
const AUDIO_EXTENSIONS: &[&str] = &["aac", "flac", "m4a", "m4b", "mp3", "ogg", "opus", "wav"];

/// Counters describing one import scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportStats {
    /// Books inserted or updated.
    pub books: usize,
    /// Tracks inserted or updated.
    pub tracks: usize,
    /// Files that could not be read and were skipped.
    pub skipped: usize,
}

/// Tag and duration data extracted from one audio file.
struct ChapterInfo {
    title: String,
    author: Option<String>,
    album: Option<String>,
    number: Option<u32>,
    duration_ms: i64,
}

/// Imports audiobook directories into the library database.
///
/// One directory of audio files becomes one book; each audio file becomes
/// one track. Unreadable files are skipped with a warning and never abort
/// the scan.
pub struct LibraryImporter {
    database: Arc<LibraryDatabase>,
}

impl LibraryImporter {
    /// Creates a new importer over the given database.
    #[must_use]
    pub fn new(database: Arc<LibraryDatabase>) -> Self {
        Self { database }
    }

    /// Scans the given directories and upserts everything found.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if a database write fails. Unreadable audio
    /// files are counted in [`ImportStats::skipped`] instead of failing.
    pub async fn scan_directories(&self, directories: &[String]) -> Result<ImportStats, LibraryError> {
        let mut stats = ImportStats::default();

        for directory in directories {
            let root = Path::new(directory);
            if !root.is_dir() {
                warn!(directory = %root.display(), "library directory does not exist, skipping");
                continue;
            }

            for (book_dir, files) in collect_book_directories(root) {
                self.import_book_directory(&book_dir, &files, &mut stats)
                    .await?;
            }
        }

        Ok(stats)
    }

    /// Imports one directory of audio files as a book.
    async fn import_book_directory(
        &self,
        directory: &Path,
        files: &[PathBuf],
        stats: &mut ImportStats,
    ) -> Result<(), LibraryError> {
        let mut chapters: Vec<(&PathBuf, ChapterInfo)> = Vec::new();
        for path in files {
            match read_chapter_info(path) {
                Ok(info) => chapters.push((path, info)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable audio file");
                    stats.skipped += 1;
                }
            }
        }

        if chapters.is_empty() {
            return Ok(());
        }

        // Album tag wins over the directory name for the book title
        let title = chapters
            .iter()
            .find_map(|(_, info)| info.album.clone())
            .unwrap_or_else(|| directory_name(directory));
        let author = chapters.iter().find_map(|(_, info)| info.author.clone());

        let book_id = self
            .database
            .upsert_book(&title, author.as_deref(), &directory.to_string_lossy())
            .await?;
        stats.books += 1;
        debug!(book_id, title = %title, chapters = chapters.len(), "importing book");

        // Tagged track numbers first, untagged files in path order after them
        chapters.sort_by(|(path_a, a), (path_b, b)| {
            let key_a = (a.number.unwrap_or(u32::MAX), *path_a);
            let key_b = (b.number.unwrap_or(u32::MAX), *path_b);
            key_a.cmp(&key_b)
        });

        for (index, (path, info)) in chapters.iter().enumerate() {
            let number = info
                .number
                .map_or_else(|| index as i64 + 1, i64::from);
            self.database
                .upsert_track(
                    book_id,
                    number,
                    &info.title,
                    info.duration_ms,
                    &path.to_string_lossy(),
                )
                .await?;
            stats.tracks += 1;
        }

        Ok(())
    }
}

/// Walks a root directory and groups audio files by containing directory.
fn collect_book_directories(root: &Path) -> BTreeMap<PathBuf, Vec<PathBuf>> {
    let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if entry.file_type().is_file()
            && is_audio_file(path)
            && let Some(parent) = path.parent()
        {
            groups
                .entry(parent.to_path_buf())
                .or_default()
                .push(path.to_path_buf());
        }
    }

    for files in groups.values_mut() {
        files.sort();
    }

    groups
}

/// Whether a path has a recognized audio file extension.
fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Reads tags and duration from one audio file.
fn read_chapter_info(path: &Path) -> Result<ChapterInfo, LoftyError> {
    let tagged = Probe::open(path)?.read()?;
    let duration_ms = tagged.properties().duration().as_millis() as i64;

    let tag = tagged.primary_tag().or_else(|| tagged.first_tag());
    let title = tag
        .and_then(|t| t.title().map(|s| s.to_string()))
        .unwrap_or_else(|| file_stem(path));
    let author = tag.and_then(|t| t.artist().map(|s| s.to_string()));
    let album = tag.and_then(|t| t.album().map(|s| s.to_string()));
    let number = tag.and_then(Accessor::track);

    Ok(ChapterInfo {
        title,
        author,
        album,
        number,
        duration_ms,
    })
}

fn directory_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy().to_string(), |n| n.to_string_lossy().to_string())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.to_string_lossy().to_string(), |s| s.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, write};

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("/books/a/01.mp3")));
        assert!(is_audio_file(Path::new("/books/a/01.M4B")));
        assert!(!is_audio_file(Path::new("/books/a/cover.jpg")));
        assert!(!is_audio_file(Path::new("/books/a/notes")));
    }

    #[test]
    fn test_collect_book_directories_groups_by_parent() {
        let root = TempDir::new().unwrap();
        create_dir_all(root.path().join("a")).unwrap();
        create_dir_all(root.path().join("b")).unwrap();
        write(root.path().join("a/02.mp3"), b"x").unwrap();
        write(root.path().join("a/01.mp3"), b"x").unwrap();
        write(root.path().join("a/cover.jpg"), b"x").unwrap();
        write(root.path().join("b/ch1.m4b"), b"x").unwrap();

        let groups = collect_book_directories(root.path());
        assert_eq!(groups.len(), 2);

        let a_files = &groups[&root.path().join("a")];
        assert_eq!(a_files.len(), 2);
        // Sorted within the group
        assert!(a_files[0].ends_with("01.mp3"));

        assert_eq!(groups[&root.path().join("b")].len(), 1);
    }

    #[tokio::test]
    async fn test_scan_skips_unreadable_files() {
        let library_root = TempDir::new().unwrap();
        create_dir_all(library_root.path().join("broken-book")).unwrap();
        write(library_root.path().join("broken-book/01.mp3"), b"not audio").unwrap();

        let db_dir = TempDir::new().unwrap();
        let database = Arc::new(
            LibraryDatabase::with_database_path(db_dir.path().join("library.db"))
                .await
                .unwrap(),
        );

        let importer = LibraryImporter::new(database.clone());
        let stats = importer
            .scan_directories(&[library_root.path().to_string_lossy().to_string()])
            .await
            .unwrap();

        assert_eq!(stats.books, 0);
        assert_eq!(stats.tracks, 0);
        assert_eq!(stats.skipped, 1);
        assert!(database.get_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_missing_directory_is_noop() {
        let db_dir = TempDir::new().unwrap();
        let database = Arc::new(
            LibraryDatabase::with_database_path(db_dir.path().join("library.db"))
                .await
                .unwrap(),
        );

        let importer = LibraryImporter::new(database);
        let stats = importer
            .scan_directories(&["/does/not/exist".to_string()])
            .await
            .unwrap();
        assert_eq!(stats, ImportStats::default());
    }
}
