//! Playlist loading and playback control API.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::json;

use super::{ApiResult, session_error};
use crate::app::SharedState;
use crate::services::session::ClipSource;

#[derive(Debug, Default, Deserialize)]
pub struct GameQuery {
    pub broadcaster_id: Option<String>,
}

/// GET /api/playlist
pub async fn get_playlist(State(state): State<SharedState>) -> ApiResult {
    let snapshot = state.session().snapshot().await;
    Ok(Json(json!(snapshot)))
}

/// DELETE /api/playlist – drop the playlist and destroy the player
pub async fn clear_playlist(State(state): State<SharedState>) -> ApiResult {
    state.session().clear().await;
    Ok(Json(json!({ "status": "ok" })))
}

/// POST /api/playlist/broadcaster/{id}
pub async fn load_broadcaster(
    State(state): State<SharedState>,
    Path(broadcaster_id): Path<String>,
) -> ApiResult {
    let outcome = state
        .session()
        .load(ClipSource::Broadcaster { broadcaster_id })
        .await
        .map_err(session_error)?;
    Ok(Json(json!({ "status": "ok", "result": outcome })))
}

/// POST /api/playlist/broadcaster/{id}/game/{game_id} – one page of the broadcaster's clips of a game
pub async fn load_broadcaster_game(
    State(state): State<SharedState>,
    Path((broadcaster_id, game_id)): Path<(String, String)>,
) -> ApiResult {
    let outcome = state
        .session()
        .load(ClipSource::GameForBroadcaster {
            broadcaster_id,
            game_id,
        })
        .await
        .map_err(session_error)?;
    Ok(Json(json!({ "status": "ok", "result": outcome })))
}

/// POST /api/playlist/game/{id}?broadcaster_id=
pub async fn load_game(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
    Query(query): Query<GameQuery>,
) -> ApiResult {
    let source = match query.broadcaster_id.filter(|b| !b.trim().is_empty()) {
        Some(broadcaster_id) => ClipSource::GameAndBroadcaster {
            game_id,
            broadcaster_id: broadcaster_id.trim().to_string(),
        },
        None => ClipSource::Game { game_id },
    };
    let outcome = state
        .session()
        .load(source)
        .await
        .map_err(session_error)?;
    Ok(Json(json!({ "status": "ok", "result": outcome })))
}

/// POST /api/playlist/next – skip to the next clip
pub async fn next_clip(State(state): State<SharedState>) -> ApiResult {
    let outcome = state.session().skip().await.map_err(session_error)?;
    Ok(Json(json!({ "status": "ok", "result": outcome })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn state() -> SharedState {
        SharedState::new(AppConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            token_url: "http://127.0.0.1:9/oauth2/token".into(),
            helix_base_url: "http://127.0.0.1:9/helix".into(),
            ..AppConfig::default()
        })
    }

    #[tokio::test]
    async fn empty_playlist_snapshot() {
        let Json(body) = get_playlist(State(state())).await.unwrap();
        assert_eq!(body["playlist"]["entries"], json!([]));
        assert!(body["instance"].is_null());
    }

    #[tokio::test]
    async fn unreachable_twitch_is_bad_gateway() {
        let (status, _) = load_broadcaster(State(state()), Path("1234".into()))
            .await
            .unwrap_err();
        assert_eq!(status, axum::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn clear_is_ok_on_empty_session() {
        let Json(body) = clear_playlist(State(state())).await.unwrap();
        assert_eq!(body["status"], "ok");
    }
}
