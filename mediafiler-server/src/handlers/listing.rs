use axum::{extract::State, response::Html};

use crate::{
    infra::{app_state::AppState, errors::AppResult},
    render::listing_page,
};

/// Rescan every root and render the listing page.
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let files = state.run_blocking(|index| index.list()).await??;
    Ok(Html(listing_page(&files, state.archive_enabled())))
}
