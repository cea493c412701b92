use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::{api, assets, websocket};
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        .route("/ws", get(websocket::ws_handler))
        // --- Games ---
        .route("/api/games/top", get(api::games::top_games))
        // --- Game filter ---
        .route("/api/filter", get(api::filter::get_filter))
        .route("/api/filter/text", post(api::filter::set_text))
        .route("/api/filter/select", post(api::filter::select_game))
        .route("/api/filter/broadcaster", post(api::filter::set_broadcaster))
        .route("/api/filter/submit", post(api::filter::submit))
        // --- Playlist ---
        .route("/api/playlist", get(api::playlist::get_playlist).delete(api::playlist::clear_playlist))
        .route("/api/playlist/broadcaster/{id}", post(api::playlist::load_broadcaster))
        .route(
            "/api/playlist/broadcaster/{id}/game/{game_id}",
            post(api::playlist::load_broadcaster_game),
        )
        .route("/api/playlist/game/{id}", post(api::playlist::load_game))
        .route("/api/playlist/next", post(api::playlist::next_clip))
        // --- Overlay static files ---
        .route("/", get(assets::overlay_index))
        .route("/overlay/", get(assets::overlay_index))
        .route("/overlay/{*path}", get(assets::overlay_handler))
        .fallback(assets::not_found)
        // --- Middleware ---
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
