use std::collections::BTreeSet;

use super::*;

/// Helix accepts up to 100 `id` parameters per request.
const MAX_GAME_IDS: usize = 100;

impl TwitchApiClient {
    /// Get the currently most-watched games (first page).
    pub async fn list_top_games(&self) -> Result<Vec<Game>, TwitchError> {
        let games: Vec<Game> = self.get_data("games/top", &[]).await?;
        tracing::debug!(count = games.len(), "Fetched top games");
        Ok(games)
    }

    /// Resolve game ids to games. Empty input makes no request.
    pub async fn resolve_games(&self, game_ids: &BTreeSet<String>) -> Result<Vec<Game>, TwitchError> {
        let query = games_query(game_ids);
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.get_data("games", &query).await
    }
}

pub(super) fn games_query(game_ids: &BTreeSet<String>) -> Vec<(&'static str, String)> {
    game_ids
        .iter()
        .filter(|id| !id.is_empty())
        .take(MAX_GAME_IDS)
        .map(|id| ("id", id.clone()))
        .collect()
}
