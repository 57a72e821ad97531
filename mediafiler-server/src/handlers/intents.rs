use axum::{
    Json,
    extract::{Path, Query, State},
};
use mediafiler_core::IntentKind;
use serde::{Deserialize, Serialize};

use crate::infra::{app_state::AppState, errors::AppResult};

/// Only the presence of `undo` matters; `?undo`, `?undo=` and `?undo=1` all
/// select undo.
#[derive(Debug, Default, Deserialize)]
pub struct IntentQuery {
    pub undo: Option<String>,
}

impl IntentQuery {
    pub fn is_undo(&self) -> bool {
        self.undo.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct IntentResponse {
    pub id: String,
    pub action: IntentKind,
    pub undo: bool,
    /// Where the file lives after the request: the marker path, or the
    /// restored original on undo.
    pub path: String,
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<IntentQuery>,
) -> AppResult<Json<IntentResponse>> {
    request(state, IntentKind::Delete, id, query.is_undo()).await
}

pub async fn archive(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<IntentQuery>,
) -> AppResult<Json<IntentResponse>> {
    request(state, IntentKind::Archive, id, query.is_undo()).await
}

async fn request(
    state: AppState,
    kind: IntentKind,
    id: String,
    undo: bool,
) -> AppResult<Json<IntentResponse>> {
    let target = id.clone();
    let path = state
        .run_blocking(move |index| match kind {
            IntentKind::Delete => index.request_delete(&target, undo),
            IntentKind::Archive => index.request_archive(&target, undo),
        })
        .await??;

    Ok(Json(IntentResponse {
        id,
        action: kind,
        undo,
        path: path.display().to_string(),
    }))
}
