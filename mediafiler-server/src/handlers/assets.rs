use axum::{
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::infra::errors::{AppError, AppResult};

const ASSETS: &[(&str, &str)] = &[
    ("index.js", include_str!("../../assets/index.js")),
    ("index.css", include_str!("../../assets/index.css")),
];

fn content_type(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("") {
        "js" | "mjs" => "application/javascript",
        "css" => "text/css",
        "html" => "text/html",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Serve one of the assets compiled into the binary.
pub async fn serve_asset(Path(name): Path<String>) -> AppResult<Response> {
    let (_, body) = ASSETS
        .iter()
        .find(|(asset, _)| *asset == name)
        .ok_or_else(|| AppError::not_found(format!("Unknown asset: {name}")))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type(&name)),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        *body,
    )
        .into_response())
}
