pub mod sources;

use std::path::{Path, PathBuf};

use mediafiler_core::IndexSettings;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5555;
pub const DEFAULT_SUFFIXES: &[&str] = &[".mp4", ".mkv"];

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    pub fn index_settings(&self) -> IndexSettings {
        self.media.index_settings()
    }

    /// Create the archive directory if archiving is enabled and it does not
    /// exist yet.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(dir) = &self.media.archive_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    pub roots: Vec<PathBuf>,
    /// Suffixes including their leading dot.
    pub suffixes: Vec<String>,
    pub archive_dir: Option<PathBuf>,
}

impl MediaConfig {
    pub fn archive_enabled(&self) -> bool {
        self.archive_dir.is_some()
    }

    pub fn archive_dir(&self) -> Option<&Path> {
        self.archive_dir.as_deref()
    }

    pub fn index_settings(&self) -> IndexSettings {
        IndexSettings {
            roots: self.roots.clone(),
            suffixes: self.suffixes.clone(),
            archive_dir: self.archive_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
}
