//! Game filter widget state.
//!
//! While browsing, every filter-text change recomputes the candidate list
//! (case-insensitive substring match on the game name). Picking a game moves
//! to the selected state; submitting from there yields a [`GameSelection`]
//! when a broadcaster id is set.

use serde::Serialize;
use twitch_client::api::Game;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "game", rename_all = "lowercase")]
pub enum FilterState {
    Browsing,
    Selected(Game),
}

/// Emitted upward on a successful submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSelection {
    pub game: Game,
    pub broadcaster_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameFilter {
    games: Vec<Game>,
    text: String,
    filtered: Vec<Game>,
    state: FilterState,
    broadcaster_id: String,
}

impl GameFilter {
    pub fn new(games: Vec<Game>) -> Self {
        Self {
            filtered: games.clone(),
            games,
            text: String::new(),
            state: FilterState::Browsing,
            broadcaster_id: String::new(),
        }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filtered(&self) -> &[Game] {
        &self.filtered
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn broadcaster_id(&self) -> &str {
        &self.broadcaster_id
    }

    /// Replace the available games. A committed selection is kept.
    pub fn set_games(&mut self, games: Vec<Game>) {
        self.games = games;
        if self.state == FilterState::Browsing {
            self.refilter();
        }
    }

    /// Typing always returns the widget to browsing.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.state = FilterState::Browsing;
        self.refilter();
    }

    /// Commit to a game from the available list. Unknown ids are ignored.
    pub fn select(&mut self, game_id: &str) -> Option<&Game> {
        let game = self.games.iter().find(|g| g.id == game_id)?.clone();
        self.text = game.name.clone();
        self.filtered.clear();
        self.state = FilterState::Selected(game);
        match &self.state {
            FilterState::Selected(game) => Some(game),
            FilterState::Browsing => None,
        }
    }

    pub fn set_broadcaster_id(&mut self, broadcaster_id: impl Into<String>) {
        self.broadcaster_id = broadcaster_id.into().trim().to_string();
    }

    /// A selection only when a game is selected and a broadcaster id is set.
    pub fn submit(&self) -> Option<GameSelection> {
        let FilterState::Selected(game) = &self.state else {
            tracing::debug!("Filter submit ignored: no game selected");
            return None;
        };
        if self.broadcaster_id.is_empty() {
            tracing::debug!("Filter submit ignored: no broadcaster id");
            return None;
        }
        Some(GameSelection {
            game: game.clone(),
            broadcaster_id: self.broadcaster_id.clone(),
        })
    }

    fn refilter(&mut self) {
        let needle = self.text.to_lowercase();
        self.filtered = self
            .games
            .iter()
            .filter(|g| g.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
    }
}
