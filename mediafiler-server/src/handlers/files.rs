use axum::{
    body::Body,
    extract::{Path, Request, State},
    response::Response,
};
use mediafiler_core::{IndexError, identity::is_well_formed_id};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Stream the file behind `id`. Range and conditional requests are handled by
/// [`ServeFile`].
pub async fn serve_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> AppResult<Response> {
    if !is_well_formed_id(&id) {
        return Err(AppError::bad_request(format!("Malformed id: {id}")));
    }

    let lookup = id.clone();
    let path = state
        .run_blocking(move |index| index.resolve_id(&lookup))
        .await?
        .map_err(|err| match err {
            IndexError::UnknownId(id) => AppError::not_found(format!("Unknown id: {id}")),
            other => other.into(),
        })?;

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    Ok(response.map(Body::new))
}
