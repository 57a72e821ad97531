use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One media file discovered by the most recent scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Short identifier, unique within the scan that produced it.
    pub id: String,
    pub modified_at: DateTime<Utc>,
}

impl FileEntry {
    /// File name without its final extension, used as the display title.
    pub fn title(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Process-wide index configuration. Immutable once the index is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    pub roots: Vec<PathBuf>,
    /// Accepted file name suffixes, including the leading dot (e.g. `.mp4`).
    pub suffixes: Vec<String>,
    /// Archive destination; `None` disables the archive workflow.
    pub archive_dir: Option<PathBuf>,
}

impl IndexSettings {
    pub fn new<I, P>(roots: I, suffixes: &[&str]) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
            archive_dir: None,
        }
    }

    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    pub fn archive_dir(&self) -> Option<&Path> {
        self.archive_dir.as_deref()
    }

    /// Plain suffix match on the file name, no glob semantics.
    pub fn accepts(&self, path: &Path) -> bool {
        let name = path.to_string_lossy();
        self.suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }
}
