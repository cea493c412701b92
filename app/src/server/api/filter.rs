//! Game filter widget API.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::json;

use super::{ApiResult, err_json, session_error};
use crate::app::SharedState;

#[derive(Debug, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectBody {
    pub game_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BroadcasterBody {
    #[serde(default)]
    pub broadcaster_id: String,
}

/// GET /api/filter
pub async fn get_filter(State(state): State<SharedState>) -> ApiResult {
    let filter = state.session().filter().await;
    Ok(Json(json!(filter)))
}

/// POST /api/filter/text – recompute the candidate list
pub async fn set_text(State(state): State<SharedState>, Json(body): Json<TextBody>) -> ApiResult {
    let filter = state.session().set_filter_text(body.text).await;
    Ok(Json(json!(filter)))
}

/// POST /api/filter/select
pub async fn select_game(
    State(state): State<SharedState>,
    Json(body): Json<SelectBody>,
) -> ApiResult {
    let filter = state
        .session()
        .select_game(&body.game_id)
        .await
        .ok_or_else(|| err_json(404, &format!("Unknown game: {}", body.game_id)))?;
    Ok(Json(json!(filter)))
}

/// POST /api/filter/broadcaster
pub async fn set_broadcaster(
    State(state): State<SharedState>,
    Json(body): Json<BroadcasterBody>,
) -> ApiResult {
    let filter = state.session().set_broadcaster(body.broadcaster_id).await;
    Ok(Json(json!(filter)))
}

/// POST /api/filter/submit – load clips for the selected game and broadcaster
pub async fn submit(State(state): State<SharedState>) -> ApiResult {
    match state.session().submit_filter().await.map_err(session_error)? {
        Some((selection, outcome)) => Ok(Json(json!({
            "status": "ok",
            "selection": selection,
            "result": outcome,
        }))),
        None => Ok(Json(json!({
            "status": "ignored",
            "reason": "A game and a broadcaster id are required",
        }))),
    }
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
    async fn text_returns_browsing_state() {
        let Json(body) = set_text(
            State(state()),
            Json(TextBody {
                text: "fort".into(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(body["text"], "fort");
        assert_eq!(body["state"]["state"], "browsing");
    }

    #[tokio::test]
    async fn unknown_game_is_404() {
        let (status, body) = select_game(
            State(state()),
            Json(SelectBody {
                game_id: "nope".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
        assert_eq!(body.0["status"], "error");
    }

    #[tokio::test]
    async fn broadcaster_id_is_trimmed() {
        let Json(body) = set_broadcaster(
            State(state()),
            Json(BroadcasterBody {
                broadcaster_id: " 42 ".into(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(body["broadcaster_id"], "42");
    }

    #[tokio::test]
    async fn submit_without_selection_is_ignored() {
        let Json(body) = submit(State(state())).await.unwrap();
        assert_eq!(body["status"], "ignored");
    }
}
