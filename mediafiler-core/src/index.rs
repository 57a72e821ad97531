//! The index façade: the only owner of the current file list and the pending
//! intents. Both live behind one lock because mutations of one depend on
//! reading the other.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::{
    clock::{Clock, SystemClock},
    error::{IndexError, Result},
    identity::{assign_short_ids, path_digest},
    intent::{Intent, IntentKind, IntentStore},
    scanner::DirectoryScanner,
    sweeper::{RETENTION_WINDOW, SweepReport, reconcile},
    types::{FileEntry, IndexSettings},
};

#[derive(Debug, Default)]
struct IndexState {
    files: Vec<FileEntry>,
    intents: IntentStore,
}

pub struct MediaIndex {
    settings: IndexSettings,
    clock: Arc<dyn Clock>,
    state: Mutex<IndexState>,
}

impl fmt::Debug for MediaIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.try_lock();
        f.debug_struct("MediaIndex")
            .field("settings", &self.settings)
            .field("files", &state.as_ref().map(|s| s.files.len()))
            .field("intents", &state.as_ref().map(|s| s.intents.len()))
            .finish()
    }
}

impl MediaIndex {
    /// Validate settings and rebuild pending intents from marker files left on
    /// disk. Every recovered intent gets a full retention window.
    pub fn open(settings: IndexSettings, clock: Arc<dyn Clock>) -> Result<Self> {
        if settings.roots.is_empty() {
            return Err(IndexError::Config("no root directory specified".into()));
        }
        if settings.suffixes.is_empty() {
            return Err(IndexError::Config("no file suffix specified".into()));
        }

        let mut markers = DirectoryScanner::new(&settings).scan_markers()?;
        if settings.archive_dir.is_none() {
            markers.retain(|(marker, kind)| {
                if *kind == IntentKind::Archive {
                    warn!(
                        path = %marker.display(),
                        "archive marker found but archiving is disabled; ignoring"
                    );
                    return false;
                }
                true
            });
        }

        let (to_delete, to_archive): (Vec<_>, Vec<_>) = markers
            .iter()
            .partition(|(_, kind)| *kind == IntentKind::Delete);
        info!(
            count = to_delete.len(),
            paths = ?to_delete.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            "recovered pending deletes"
        );
        info!(
            count = to_archive.len(),
            paths = ?to_archive.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            "recovered pending archives"
        );

        let mut intents = IntentStore::new();
        intents.recover(markers, clock.utc_now());

        Ok(Self {
            settings,
            clock,
            state: Mutex::new(IndexState {
                files: Vec::new(),
                intents,
            }),
        })
    }

    pub fn with_system_clock(settings: IndexSettings) -> Result<Self> {
        Self::open(settings, Arc::new(SystemClock))
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    pub fn archive_enabled(&self) -> bool {
        self.settings.archive_dir.is_some()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc_now()
    }

    /// Re-walk every root, reassign identifiers and return the fresh listing,
    /// oldest first. Holds the lock for the whole walk.
    pub fn list(&self) -> Result<Vec<FileEntry>> {
        let mut state = self.state.lock();

        let mut files: Vec<FileEntry> = DirectoryScanner::new(&self.settings)
            .scan()?
            .into_iter()
            .map(|scanned| FileEntry {
                path: scanned.path,
                id: String::new(),
                modified_at: scanned.modified_at,
            })
            .collect();
        assign_short_ids(&mut files);

        state.files = files.clone();
        Ok(files)
    }

    /// Path of the entry with identifier `id` in the most recent listing.
    pub fn resolve_id(&self, id: &str) -> Result<PathBuf> {
        let state = self.state.lock();
        find_listed(&state.files, id)
            .map(Path::to_path_buf)
            .ok_or_else(|| IndexError::UnknownId(id.to_string()))
    }

    /// Mark the file behind `id` for deletion, or undo a pending deletion.
    /// Returns the path the file now lives at.
    pub fn request_delete(&self, id: &str, undo: bool) -> Result<PathBuf> {
        self.request(IntentKind::Delete, id, undo)
    }

    /// Mark the file behind `id` for archival, or undo a pending archival.
    /// Fails with [`IndexError::ArchiveDisabled`] before touching anything when
    /// no archive directory is configured.
    pub fn request_archive(&self, id: &str, undo: bool) -> Result<PathBuf> {
        if !self.archive_enabled() {
            return Err(IndexError::ArchiveDisabled);
        }
        self.request(IntentKind::Archive, id, undo)
    }

    fn request(&self, kind: IntentKind, id: &str, undo: bool) -> Result<PathBuf> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if !undo {
            let original = find_listed(&state.files, id)
                .ok_or_else(|| IndexError::UnknownId(id.to_string()))?
                .to_path_buf();
            let marker = state.intents.mark(&original, kind, self.clock.utc_now())?;
            info!(kind = %kind, id, path = %original.display(), "marked");
            return Ok(marker);
        }

        let marker = pending_marker(state, kind, id)?;
        let original = state.intents.undo(&marker)?;
        info!(kind = %kind, id, path = %original.display(), "undone");
        Ok(original)
    }

    /// Pending intents, ordered by marker path.
    pub fn pending_intents(&self) -> Vec<Intent> {
        self.state.lock().intents.pending()
    }

    /// Run one sweep as of `now`: drain intents older than the retention window
    /// under the lock, then commit them with the lock released.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let batch = {
            let mut state = self.state.lock();
            state.intents.drain_expired(retention_cutoff(now))
        };
        if batch.is_empty() {
            return SweepReport::default();
        }

        info!(
            deletes = batch.deletes.len(),
            archives = batch.archives.len(),
            "committing expired intents"
        );
        reconcile(batch, self.settings.archive_dir())
    }

    /// [`sweep`](Self::sweep) as of the index clock's current time.
    pub fn sweep_now(&self) -> SweepReport {
        self.sweep(self.clock.utc_now())
    }
}

pub fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    let window = TimeDelta::from_std(RETENTION_WINDOW).unwrap_or(TimeDelta::MAX);
    now - window
}

fn find_listed<'a>(files: &'a [FileEntry], id: &str) -> Option<&'a Path> {
    files
        .iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.path.as_path())
}

/// Marker of the pending `kind` intent addressed by `id`.
///
/// The id is looked up in the current listing first. When a rescan has since
/// dropped the file, pending intents are matched by the digest of their
/// original path instead; an ambiguous prefix matches nothing.
fn pending_marker(state: &IndexState, kind: IntentKind, id: &str) -> Result<PathBuf> {
    let listed = find_listed(&state.files, id);
    if let Some(original) = listed {
        let marker = kind.marker_for(original);
        if state.intents.contains(&marker) {
            return Ok(marker);
        }
    }

    let mut candidates = state
        .intents
        .iter()
        .filter(|intent| intent.kind == kind)
        .filter(|intent| path_digest(&intent.original()).starts_with(id));
    if let (Some(intent), None) = (candidates.next(), candidates.next()) {
        return Ok(intent.marker.clone());
    }

    match listed {
        Some(original) => Err(IndexError::InvalidTarget(kind.marker_for(original))),
        None => Err(IndexError::UnknownId(id.to_string())),
    }
}
