//! REST API handlers grouped by domain.

pub mod filter;
pub mod games;
pub mod playlist;

use axum::Json;
use serde_json::{Value, json};

use crate::services::session::SessionError;

pub type ApiResult = Result<Json<Value>, (axum::http::StatusCode, Json<Value>)>;

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> (axum::http::StatusCode, Json<Value>) {
    (
        axum::http::StatusCode::from_u16(status).unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

/// Upstream Twitch failures are a bad gateway; playlist failures are unprocessable.
pub fn session_error(e: SessionError) -> (axum::http::StatusCode, Json<Value>) {
    match &e {
        SessionError::Twitch(_) => err_json(502, &e.to_string()),
        SessionError::Playlist(_) => err_json(422, &e.to_string()),
    }
}
