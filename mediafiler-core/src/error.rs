use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors surfaced by the index façade to its callers.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Archiving is disabled: no archive directory configured")]
    ArchiveDisabled,

    #[error("Unknown id: {0}")]
    UnknownId(String),

    #[error("Invalid target: {}", .0.display())]
    InvalidTarget(PathBuf),

    #[error("Rename {} -> {} failed: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot scan root {}: {source}", root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IndexError {
    /// True when the error was caused by the caller rather than the host, such
    /// as a stale id or a rename whose source is gone or whose destination is
    /// already taken.
    pub fn is_client_error(&self) -> bool {
        match self {
            IndexError::ArchiveDisabled
            | IndexError::UnknownId(_)
            | IndexError::InvalidTarget(_) => true,
            IndexError::Rename { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::AlreadyExists
            ),
            IndexError::Config(_) | IndexError::Scan { .. } => false,
        }
    }
}

/// Per-file failures of the reconciliation sweeper. These are logged and never
/// abort a sweep.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move {} -> {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to inspect {}: {source}", path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "Cannot archive {}: {} exists with size {existing_size} (marker is {marker_size})",
        marker.display(),
        destination.display()
    )]
    Conflict {
        marker: PathBuf,
        destination: PathBuf,
        marker_size: u64,
        existing_size: u64,
    },

    #[error("Marker {} has no archive suffix", .0.display())]
    NotAnArchiveMarker(PathBuf),
}

pub type Result<T> = std::result::Result<T, IndexError>;
