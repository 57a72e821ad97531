// Shared by several integration test binaries; not every helper is used by each.
#![allow(dead_code)]

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime},
};

use chrono::{TimeZone, Utc};
use mediafiler_core::{IndexSettings, ManualClock, MediaIndex};
use tempfile::TempDir;

pub struct Fixture {
    pub media: TempDir,
    pub archive: TempDir,
    pub clock: ManualClock,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            media: TempDir::new().expect("media tempdir"),
            archive: TempDir::new().expect("archive tempdir"),
            clock: ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn root(&self) -> &Path {
        self.media.path()
    }

    pub fn settings(&self) -> IndexSettings {
        IndexSettings::new([self.root()], &[".mp4", ".mkv"])
    }

    pub fn archive_settings(&self) -> IndexSettings {
        self.settings().with_archive_dir(self.archive.path())
    }

    pub fn open(&self, settings: IndexSettings) -> MediaIndex {
        MediaIndex::open(settings, Arc::new(self.clock.clone())).expect("index opens")
    }

    /// Create `name` under the media root, `age` old, holding `bytes`.
    pub fn file(&self, name: &str, age: Duration, bytes: &[u8]) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        path
    }
}

pub fn minutes(n: i64) -> chrono::TimeDelta {
    chrono::TimeDelta::minutes(n)
}
