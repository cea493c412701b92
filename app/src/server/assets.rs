//! Static file serving for the clip overlay page (web/dist).

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;
use serde_json::json;

#[derive(Embed)]
#[folder = "../web/dist/"]
struct OverlayAssets;

pub async fn overlay_handler(axum::extract::Path(path): axum::extract::Path<String>) -> Response {
    serve_embedded::<OverlayAssets>(&path)
}

pub async fn overlay_index() -> Response {
    serve_embedded::<OverlayAssets>("index.html")
}

/// JSON 404 for anything the router does not know.
pub async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({
            "error": "Not Found",
            "path": uri.path(),
        })),
    )
        .into_response()
}

fn serve_embedded<E: Embed>(path: &str) -> Response {
    match E::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
