use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use mediafiler_core::FileEntry;
use serde::Serialize;

use crate::infra::{app_state::AppState, errors::AppResult};

#[derive(Debug, Serialize)]
pub struct FileView {
    pub id: String,
    pub title: String,
    pub path: String,
    pub modified_at: DateTime<Utc>,
}

impl From<&FileEntry> for FileView {
    fn from(entry: &FileEntry) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.title(),
            path: entry.path.display().to_string(),
            modified_at: entry.modified_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub archive_enabled: bool,
    pub files: Vec<FileView>,
}

pub async fn list_files(State(state): State<AppState>) -> AppResult<Json<FilesResponse>> {
    let files = state.run_blocking(|index| index.list()).await??;
    Ok(Json(FilesResponse {
        archive_enabled: state.archive_enabled(),
        files: files.iter().map(FileView::from).collect(),
    }))
}
