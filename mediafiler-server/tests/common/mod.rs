use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime},
};

use axum_test::TestServer;
use chrono::{TimeDelta, TimeZone, Utc};
use mediafiler_core::{IndexSettings, ManualClock, MediaIndex};
use mediafiler_server::{AppState, create_app};
use tempfile::TempDir;

// Shared by several test binaries; not every helper is used in each.
#[allow(unused)]
pub struct TestApp {
    pub server: TestServer,
    pub index: Arc<MediaIndex>,
    pub clock: ManualClock,
    pub media: TempDir,
    pub archive: Option<TempDir>,
}

#[allow(unused)]
impl TestApp {
    pub fn root(&self) -> &Path {
        self.media.path()
    }

    pub fn archive_dir(&self) -> &Path {
        self.archive
            .as_ref()
            .map(TempDir::path)
            .unwrap_or_else(|| panic!("archiving disabled in this test app"))
    }

    /// Current listing, oldest first, as `(id, file name)` pairs.
    pub async fn listing(&self) -> Vec<(String, String)> {
        let body: serde_json::Value = self.server.get("/api/files").await.json();
        body["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|file| {
                let path = PathBuf::from(file["path"].as_str().unwrap());
                (
                    file["id"].as_str().unwrap().to_string(),
                    path.file_name().unwrap().to_string_lossy().into_owned(),
                )
            })
            .collect()
    }

    pub async fn id_of(&self, name: &str) -> String {
        self.listing()
            .await
            .into_iter()
            .find(|(_, file)| file == name)
            .map(|(id, _)| id)
            .unwrap_or_else(|| panic!("{name} not listed"))
    }

    pub fn advance(&self, minutes: i64) {
        self.clock.advance(TimeDelta::minutes(minutes));
    }
}

/// Write `name` under `root` with an mtime `age` in the past.
#[allow(unused)]
pub fn media_file(root: &Path, name: &str, age: Duration, bytes: &[u8]) -> PathBuf {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, bytes).unwrap();
    let file = fs::File::options().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
    path
}

#[allow(unused)]
pub fn build_test_app(archive: bool, seed: impl FnOnce(&Path)) -> TestApp {
    let media = TempDir::new().unwrap();
    seed(media.path());
    let archive = archive.then(|| TempDir::new().unwrap());

    let mut settings = IndexSettings::new([media.path()], &[".mp4", ".mkv"]);
    if let Some(dir) = &archive {
        settings = settings.with_archive_dir(dir.path());
    }

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    let index = Arc::new(MediaIndex::open(settings, Arc::new(clock.clone())).unwrap());
    let server = TestServer::new(create_app(AppState::new(Arc::clone(&index)))).unwrap();

    TestApp {
        server,
        index,
        clock,
        media,
        archive,
    }
}
