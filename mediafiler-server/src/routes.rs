use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{api, assets, files, intents, listing, ping},
    infra::app_state::AppState,
};

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(listing::index))
        .route("/f/{id}", get(files::serve_file))
        .route("/delete/{id}", get(intents::delete).post(intents::delete))
        .route("/archive/{id}", get(intents::archive).post(intents::archive))
        .route("/api/files", get(api::list_files))
        .route("/asset/{name}", get(assets::serve_asset))
        .route("/ping", get(ping::ping))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
