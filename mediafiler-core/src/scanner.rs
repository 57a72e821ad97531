use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::{
    error::{IndexError, Result},
    intent::IntentKind,
    types::IndexSettings,
};

/// A regular file found under one of the configured roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub modified_at: DateTime<Utc>,
}

/// Read-only recursive walker over the configured roots.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryScanner<'a> {
    settings: &'a IndexSettings,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(settings: &'a IndexSettings) -> Self {
        Self { settings }
    }

    /// Every file whose name ends with an accepted suffix, oldest first.
    /// Ties on modification time are broken by path.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        let mut files = Vec::new();
        for root in &self.settings.roots {
            walk_root(root, |entry| {
                if !self.settings.accepts(entry.path()) {
                    return;
                }
                match modified_at(entry) {
                    Ok(modified_at) => files.push(ScannedFile {
                        path: entry.path().to_path_buf(),
                        modified_at,
                    }),
                    Err(err) => {
                        warn!(
                            path = %entry.path().display(),
                            error = %err,
                            "skipping file without metadata"
                        )
                    }
                }
            })?;
        }

        files.sort_by(|a, b| {
            a.modified_at
                .cmp(&b.modified_at)
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(files)
    }

    /// Marker files left behind by intents that were never reconciled.
    pub fn scan_markers(&self) -> Result<Vec<(PathBuf, IntentKind)>> {
        let mut markers = Vec::new();
        for root in &self.settings.roots {
            walk_root(root, |entry| {
                if let Some(kind) = IntentKind::of_marker(entry.path()) {
                    markers.push((entry.path().to_path_buf(), kind));
                }
            })?;
        }
        markers.sort();
        Ok(markers)
    }
}

/// Visit every regular file below `root`. The root itself must be a readable
/// directory; anything that disappears or fails further down is logged and
/// skipped.
fn walk_root<F>(root: &Path, mut visit: F) -> Result<()>
where
    F: FnMut(&DirEntry),
{
    let scan_error = |source| IndexError::Scan {
        root: root.to_path_buf(),
        source,
    };

    let meta = fs::metadata(root).map_err(scan_error)?;
    if !meta.is_dir() {
        return Err(scan_error(io::Error::new(
            io::ErrorKind::NotADirectory,
            "root is not a directory",
        )));
    }

    for item in WalkDir::new(root).follow_links(false) {
        match item {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    visit(&entry);
                }
            }
            Err(err) if err.depth() == 0 => {
                let source = err.into_io_error().unwrap_or_else(|| {
                    io::Error::other("filesystem loop at scan root")
                });
                return Err(scan_error(source));
            }
            Err(err) => {
                warn!(
                    root = %root.display(),
                    path = ?err.path(),
                    error = %err,
                    "directory vanished or became unreadable during scan"
                );
            }
        }
    }
    Ok(())
}

fn modified_at(entry: &DirEntry) -> io::Result<DateTime<Utc>> {
    let meta = entry.metadata().map_err(io::Error::from)?;
    Ok(DateTime::<Utc>::from(meta.modified()?))
}
