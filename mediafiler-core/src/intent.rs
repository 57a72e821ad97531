//! Pending delete/archive intents.
//!
//! An intent is encoded on disk by renaming the file with a kind-specific
//! marker suffix. The [`IntentStore`] caches those renames together with the
//! time they were requested; it is rebuilt from disk on startup.

use std::{
    collections::HashMap,
    ffi::{OsStr, OsString},
    fmt, fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{IndexError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    Delete,
    Archive,
}

impl IntentKind {
    pub const ALL: [IntentKind; 2] = [IntentKind::Delete, IntentKind::Archive];

    pub fn as_str(self) -> &'static str {
        match self {
            IntentKind::Delete => "delete",
            IntentKind::Archive => "archive",
        }
    }

    /// Suffix appended to a file name while the intent is pending.
    pub fn marker_suffix(self) -> &'static str {
        match self {
            IntentKind::Delete => ".delete",
            IntentKind::Archive => ".archive",
        }
    }

    /// Marker path for `original`.
    pub fn marker_for(self, original: &Path) -> PathBuf {
        let mut name = OsString::from(original.as_os_str());
        name.push(self.marker_suffix());
        PathBuf::from(name)
    }

    /// Original path of `marker`, if it carries this kind's suffix.
    /// Works on the raw encoded bytes so names that are not valid UTF-8
    /// round-trip exactly.
    pub fn original_of(self, marker: &Path) -> Option<PathBuf> {
        let raw = marker.as_os_str().as_encoded_bytes();
        let original = raw.strip_suffix(self.marker_suffix().as_bytes())?;
        if original
            .last()
            .is_none_or(|&last| std::path::is_separator(char::from(last)))
        {
            return None;
        }
        // SAFETY: `original` comes from `as_encoded_bytes` on this path and is
        // split immediately before the ASCII marker suffix.
        let original = unsafe { OsStr::from_encoded_bytes_unchecked(original) };
        Some(PathBuf::from(original))
    }

    /// Kind of a marker path, judged by its suffix alone.
    pub fn of_marker(marker: &Path) -> Option<IntentKind> {
        IntentKind::ALL
            .into_iter()
            .find(|kind| kind.original_of(marker).is_some())
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intent {
    pub marker: PathBuf,
    pub kind: IntentKind,
    pub requested_at: DateTime<Utc>,
}

impl Intent {
    pub fn original(&self) -> PathBuf {
        self.kind
            .original_of(&self.marker)
            .unwrap_or_else(|| self.marker.clone())
    }
}

/// Expired intents removed from the store by a single sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DrainedBatch {
    pub deletes: Vec<PathBuf>,
    pub archives: Vec<PathBuf>,
}

impl DrainedBatch {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.archives.is_empty()
    }
}

/// Marker path -> pending intent.
#[derive(Debug, Default)]
pub struct IntentStore {
    entries: HashMap<PathBuf, Intent>,
}

impl IntentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename `original` to its marker and record the intent. Nothing is
    /// recorded unless the rename succeeds.
    pub fn mark(
        &mut self,
        original: &Path,
        kind: IntentKind,
        now: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let marker = kind.marker_for(original);
        rename_without_clobber(original, &marker)?;
        debug!(kind = %kind, marker = %marker.display(), "intent recorded");

        self.entries.insert(
            marker.clone(),
            Intent {
                marker: marker.clone(),
                kind,
                requested_at: now,
            },
        );
        Ok(marker)
    }

    /// Rename `marker` back to its original name and forget the intent.
    pub fn undo(&mut self, marker: &Path) -> Result<PathBuf> {
        let intent = self
            .entries
            .get(marker)
            .ok_or_else(|| IndexError::InvalidTarget(marker.to_path_buf()))?;
        let original = intent
            .kind
            .original_of(marker)
            .ok_or_else(|| IndexError::InvalidTarget(marker.to_path_buf()))?;

        rename_without_clobber(marker, &original)?;
        self.entries.remove(marker);
        debug!(original = %original.display(), "intent undone");
        Ok(original)
    }

    /// Seed the store with markers left on disk by a previous run. They are
    /// stamped `now` so a restart never shortens the undo window.
    pub fn recover<I>(&mut self, markers: I, now: DateTime<Utc>) -> usize
    where
        I: IntoIterator<Item = (PathBuf, IntentKind)>,
    {
        let mut recovered = 0;
        for (marker, kind) in markers {
            self.entries.insert(
                marker.clone(),
                Intent {
                    marker,
                    kind,
                    requested_at: now,
                },
            );
            recovered += 1;
        }
        recovered
    }

    /// Remove every intent requested strictly before `cutoff`, split by kind.
    pub fn drain_expired(&mut self, cutoff: DateTime<Utc>) -> DrainedBatch {
        let mut batch = DrainedBatch::default();
        self.entries.retain(|marker, intent| {
            if intent.requested_at >= cutoff {
                return true;
            }
            match intent.kind {
                IntentKind::Delete => batch.deletes.push(marker.clone()),
                IntentKind::Archive => batch.archives.push(marker.clone()),
            }
            false
        });
        batch.deletes.sort();
        batch.archives.sort();
        batch
    }

    pub fn contains(&self, marker: &Path) -> bool {
        self.entries.contains_key(marker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending intents ordered by marker path.
    pub fn pending(&self) -> Vec<Intent> {
        let mut pending: Vec<Intent> = self.entries.values().cloned().collect();
        pending.sort_by(|a, b| a.marker.cmp(&b.marker));
        pending
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intent> {
        self.entries.values()
    }
}

fn rename_without_clobber(from: &Path, to: &Path) -> Result<()> {
    let rename_error = |source| IndexError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if fs::symlink_metadata(to).is_ok() {
        return Err(rename_error(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "destination already exists",
        )));
    }
    fs::rename(from, to).map_err(rename_error)
}
