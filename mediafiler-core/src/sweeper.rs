//! Reconciliation of expired intents into real filesystem actions.
//!
//! A sweep drains expired intents from the index under its lock, releases the
//! lock, then deletes or archives each marker. Per-file failures are logged and
//! reported but never stop the sweep.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    error::ReconcileError,
    index::MediaIndex,
    intent::{DrainedBatch, IntentKind},
};

/// Minimum time a marked file stays undoable. The sweeper also ticks at this
/// period, so an intent is committed between one and two windows after it was
/// requested.
pub const RETENTION_WINDOW: Duration = Duration::from_secs(11 * 60);

/// What a single sweep did.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub deleted: Vec<PathBuf>,
    /// `(marker, destination)` pairs moved into the archive.
    pub archived: Vec<(PathBuf, PathBuf)>,
    /// Markers removed because an identical-size copy was already archived.
    pub already_archived: Vec<PathBuf>,
    pub failures: Vec<ReconcileError>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
            && self.archived.is_empty()
            && self.already_archived.is_empty()
            && self.failures.is_empty()
    }

    /// Markers left on disk because the archive already holds a different
    /// file under the same name.
    pub fn conflicts(&self) -> impl Iterator<Item = &Path> {
        self.failures.iter().filter_map(|failure| match failure {
            ReconcileError::Conflict { marker, .. } => Some(marker.as_path()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Moved(PathBuf),
    AlreadyArchived,
}

/// Perform the terminal filesystem action for every drained intent.
pub fn reconcile(batch: DrainedBatch, archive_dir: Option<&Path>) -> SweepReport {
    let mut report = SweepReport::default();

    for marker in batch.deletes {
        info!(path = %marker.display(), "delete");
        match fs::remove_file(&marker) {
            Ok(()) => report.deleted.push(marker),
            Err(source) => {
                let failure = ReconcileError::Remove {
                    path: marker,
                    source,
                };
                error!(error = %failure, "delete failed");
                report.failures.push(failure);
            }
        }
    }

    for marker in batch.archives {
        let Some(archive_dir) = archive_dir else {
            warn!(
                path = %marker.display(),
                "archive marker drained with archiving disabled; leaving it in place"
            );
            continue;
        };
        match commit_archive(&marker, archive_dir) {
            Ok(ArchiveOutcome::Moved(destination)) => {
                report.archived.push((marker, destination))
            }
            Ok(ArchiveOutcome::AlreadyArchived) => {
                report.already_archived.push(marker)
            }
            Err(failure) => {
                match &failure {
                    ReconcileError::Conflict { .. } => {
                        warn!(
                            error = %failure,
                            "archive conflict, leaving marker for an operator"
                        )
                    }
                    _ => error!(error = %failure, "archive failed"),
                }
                report.failures.push(failure);
            }
        }
    }

    report
}

/// Archive destination for `marker`: its original file name inside
/// `archive_dir`.
pub fn archive_destination(
    marker: &Path,
    archive_dir: &Path,
) -> Result<PathBuf, ReconcileError> {
    let original = IntentKind::Archive
        .original_of(marker)
        .ok_or_else(|| ReconcileError::NotAnArchiveMarker(marker.to_path_buf()))?;
    let name = original
        .file_name()
        .ok_or_else(|| ReconcileError::NotAnArchiveMarker(marker.to_path_buf()))?;
    Ok(archive_dir.join(name))
}

/// Move one archive marker into `archive_dir`.
///
/// If the destination already exists with the same size the marker is treated
/// as archived by an earlier, interrupted sweep and removed. A size mismatch is
/// a conflict: both files are left untouched.
pub fn commit_archive(
    marker: &Path,
    archive_dir: &Path,
) -> Result<ArchiveOutcome, ReconcileError> {
    let destination = archive_destination(marker, archive_dir)?;

    match fs::metadata(&destination) {
        Ok(existing) => {
            let marker_size = fs::metadata(marker)
                .map_err(|source| ReconcileError::Inspect {
                    path: marker.to_path_buf(),
                    source,
                })?
                .len();
            if marker_size != existing.len() {
                return Err(ReconcileError::Conflict {
                    marker: marker.to_path_buf(),
                    destination,
                    marker_size,
                    existing_size: existing.len(),
                });
            }
            info!(path = %marker.display(), "already archived");
            fs::remove_file(marker).map_err(|source| ReconcileError::Remove {
                path: marker.to_path_buf(),
                source,
            })?;
            Ok(ArchiveOutcome::AlreadyArchived)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(
                path = %marker.display(),
                destination = %destination.display(),
                "archive"
            );
            move_file(marker, &destination).map_err(|source| {
                ReconcileError::Move {
                    from: marker.to_path_buf(),
                    to: destination.clone(),
                    source,
                }
            })?;
            Ok(ArchiveOutcome::Moved(destination))
        }
        Err(source) => Err(ReconcileError::Inspect {
            path: destination,
            source,
        }),
    }
}

/// Rename, falling back to copy + remove when the destination lives on
/// another filesystem.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            if let Err(copy_err) = fs::copy(from, to) {
                let _ = fs::remove_file(to);
                return Err(copy_err);
            }
            fs::remove_file(from)
        }
        Err(err) => Err(err),
    }
}

/// Background task that sweeps the index every [`RETENTION_WINDOW`].
#[derive(Debug)]
pub struct Sweeper {
    index: Arc<MediaIndex>,
}

impl Sweeper {
    pub fn new(index: Arc<MediaIndex>) -> Self {
        Self { index }
    }

    /// Start ticking. The first sweep runs one full period after spawning.
    pub fn spawn(self, shutdown: CancellationToken) -> SweeperHandle {
        let (completed_tx, completed_rx) = watch::channel(0u64);
        let token = shutdown.clone();
        let join = tokio::spawn(async move {
            self.run(token, completed_tx).await;
        });

        SweeperHandle {
            shutdown,
            completed: completed_rx,
            join,
        }
    }

    async fn run(self, shutdown: CancellationToken, completed: watch::Sender<u64>) {
        let mut ticker =
            tokio::time::interval_at(Instant::now() + RETENTION_WINDOW, RETENTION_WINDOW);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_secs = RETENTION_WINDOW.as_secs(), "sweeper started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let index = Arc::clone(&self.index);
            match tokio::task::spawn_blocking(move || index.sweep_now()).await {
                Ok(report) => {
                    if !report.is_empty() {
                        info!(
                            deleted = report.deleted.len(),
                            archived = report.archived.len(),
                            already_archived = report.already_archived.len(),
                            failures = report.failures.len(),
                            "sweep finished"
                        );
                    }
                }
                Err(err) => error!(error = %err, "sweep task panicked"),
            }
            completed.send_modify(|count| *count += 1);
        }

        info!("sweeper stopped");
    }
}

/// Handle to a running [`Sweeper`].
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: CancellationToken,
    completed: watch::Receiver<u64>,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    /// Number of sweeps finished so far; changes after every tick.
    pub fn completed(&self) -> watch::Receiver<u64> {
        self.completed.clone()
    }

    /// Stop ticking and wait for an in-flight sweep to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(err) = self.join.await {
            error!(error = %err, "sweeper task ended abnormally");
        }
    }
}
