//! Game listing API.

use axum::Json;
use axum::extract::State;
use serde_json::json;

use super::{ApiResult, session_error};
use crate::app::SharedState;

/// GET /api/games/top – refresh the top games and feed the filter
pub async fn top_games(State(state): State<SharedState>) -> ApiResult {
    let games = state
        .session()
        .refresh_games()
        .await
        .map_err(session_error)?;
    Ok(Json(json!({ "games": games, "count": games.len() })))
}
