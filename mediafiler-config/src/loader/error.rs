use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {}", path.display())]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no root directory specified")]
    NoRoots,
    #[error("no file suffix specified")]
    NoSuffixes,
    #[error("archive path {} exists but is not a directory", path.display())]
    ArchiveDirNotDirectory { path: PathBuf },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
