//! Clip session: fetch, shape and play clips for one overlay session.
//!
//! Every fetch takes a ticket from the request sequencer; a response is
//! only applied if no newer fetch started meanwhile. Fetch failures are
//! logged and leave the current playlist untouched.

use std::collections::{BTreeSet, HashMap};

use clip_playlist::{
    EndedOutcome, GameFilter, GameSelection, InstanceId, PlaybackOrchestrator, Playlist,
    PlaylistBuilder, PlaylistError, RequestSequencer, game_names,
};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::{Mutex, broadcast};
use twitch_client::TwitchError;
use twitch_client::api::{ClipRecord, Game, TwitchApiClient};

use super::ws_player::{WsPlayer, player_construct_message};
use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Twitch error: {0}")]
    Twitch(#[from] TwitchError),
    #[error("Playlist error: {0}")]
    Playlist(#[from] PlaylistError),
}

/// Which clips to load into the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipSource {
    Broadcaster { broadcaster_id: String },
    /// A broadcaster's clips of one game, with the default page size.
    GameForBroadcaster { broadcaster_id: String, game_id: String },
    Game { game_id: String },
    GameAndBroadcaster { game_id: String, broadcaster_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { clips: usize },
    Cleared,
    /// A newer fetch started before this one finished.
    Superseded,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistSnapshot {
    pub playlist: Playlist,
    pub instance: Option<InstanceId>,
}

pub struct ClipSession {
    api: TwitchApiClient,
    builder: PlaylistBuilder,
    sequencer: RequestSequencer,
    orchestrator: Mutex<PlaybackOrchestrator<WsPlayer>>,
    filter: Mutex<GameFilter>,
    ws_tx: broadcast::Sender<String>,
    clip_count: u32,
    shuffle: bool,
}

impl ClipSession {
    pub fn new(api: TwitchApiClient, config: &AppConfig, ws_tx: broadcast::Sender<String>) -> Self {
        let orchestrator = PlaybackOrchestrator::new(WsPlayer::new(ws_tx.clone()), &config.parent_domain)
            .with_size(config.player_width, config.player_height)
            .with_end_behavior(config.end_behavior());

        let mut filter = GameFilter::new(Vec::new());
        filter.set_broadcaster_id(config.broadcaster_id.clone());

        Self {
            api,
            builder: PlaylistBuilder::new(&config.parent_domain),
            sequencer: RequestSequencer::new(),
            orchestrator: Mutex::new(orchestrator),
            filter: Mutex::new(filter),
            ws_tx,
            clip_count: config.clip_count,
            shuffle: config.shuffle,
        }
    }

    /// Fetch clips for `source` and make them the current playlist.
    pub async fn load(&self, source: ClipSource) -> Result<LoadOutcome, SessionError> {
        let ticket = self.sequencer.begin();
        tracing::info!(?source, "Loading clips");

        let clips = self.fetch_clips(&source).await.inspect_err(|e| {
            tracing::error!(?source, error = %e, "Failed to fetch clips");
        })?;
        let names = self.resolve_game_names(&clips).await;
        let entries = self.shape(&clips, &names);

        let count = entries.len();
        let snapshot = {
            let mut orchestrator = self.orchestrator.lock().await;
            // Checked under the lock so a newer load cannot apply in between.
            if !self.sequencer.is_current(ticket) {
                tracing::debug!(?source, "Discarding superseded clip response");
                return Ok(LoadOutcome::Superseded);
            }
            if count == 0 {
                tracing::warn!(?source, "No clips found");
            }
            orchestrator.replace_playlist(Playlist::new(entries))?;
            snapshot_of(&orchestrator)
        };
        self.broadcast(playlist_message(&snapshot));

        Ok(if count == 0 {
            LoadOutcome::Cleared
        } else {
            LoadOutcome::Loaded { clips: count }
        })
    }

    async fn fetch_clips(&self, source: &ClipSource) -> Result<Vec<ClipRecord>, TwitchError> {
        match source {
            ClipSource::Broadcaster { broadcaster_id } => {
                self.api.list_clips(broadcaster_id, self.clip_count).await
            }
            ClipSource::GameForBroadcaster {
                broadcaster_id,
                game_id,
            } => self.api.list_clips_for_game(broadcaster_id, game_id).await,
            ClipSource::Game { game_id } => {
                self.api.list_clips_by_game(game_id, self.clip_count).await
            }
            ClipSource::GameAndBroadcaster {
                game_id,
                broadcaster_id,
            } => {
                self.api
                    .list_clips_by_game_and_broadcaster(game_id, broadcaster_id, self.clip_count)
                    .await
            }
        }
    }

    /// Names for every game referenced by `clips`; lookup failures degrade
    /// to the unknown-game label.
    async fn resolve_game_names(&self, clips: &[ClipRecord]) -> HashMap<String, String> {
        let ids: BTreeSet<String> = clips.iter().map(|c| c.game_id.clone()).collect();
        match self.api.resolve_games(&ids).await {
            Ok(games) => game_names(&games),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to resolve game names");
                HashMap::new()
            }
        }
    }

    fn shape(&self, clips: &[ClipRecord], names: &HashMap<String, String>) -> Vec<clip_playlist::PlaylistEntry> {
        if self.shuffle {
            self.builder
                .build_shuffled(clips, names, &mut rand::thread_rng())
        } else {
            self.builder.build(clips, names)
        }
    }

    /// Fetch the top games and hand them to the filter widget.
    pub async fn refresh_games(&self) -> Result<Vec<Game>, SessionError> {
        let games = self.api.list_top_games().await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to fetch top games");
        })?;
        self.filter.lock().await.set_games(games.clone());
        tracing::info!(count = games.len(), "Top games refreshed");
        Ok(games)
    }

    pub async fn filter(&self) -> GameFilter {
        self.filter.lock().await.clone()
    }

    pub async fn set_filter_text(&self, text: String) -> GameFilter {
        let mut filter = self.filter.lock().await;
        filter.set_text(text);
        filter.clone()
    }

    /// Returns `None` when the game id is not in the available list.
    pub async fn select_game(&self, game_id: &str) -> Option<GameFilter> {
        let mut filter = self.filter.lock().await;
        filter.select(game_id)?;
        Some(filter.clone())
    }

    pub async fn set_broadcaster(&self, broadcaster_id: String) -> GameFilter {
        let mut filter = self.filter.lock().await;
        filter.set_broadcaster_id(broadcaster_id);
        filter.clone()
    }

    /// Submit the filter. Loads clips when it yields a selection.
    pub async fn submit_filter(&self) -> Result<Option<(GameSelection, LoadOutcome)>, SessionError> {
        let Some(selection) = self.filter.lock().await.submit() else {
            return Ok(None);
        };
        tracing::info!(
            game = %selection.game.name,
            broadcaster_id = %selection.broadcaster_id,
            "Game selected"
        );
        let outcome = self
            .load(ClipSource::GameAndBroadcaster {
                game_id: selection.game.id.clone(),
                broadcaster_id: selection.broadcaster_id.clone(),
            })
            .await?;
        Ok(Some((selection, outcome)))
    }

    /// ENDED notification from an overlay for `instance` while it showed the
    /// clip at `cursor`.
    pub async fn clip_ended(
        &self,
        instance: InstanceId,
        cursor: usize,
    ) -> Result<EndedOutcome, SessionError> {
        let mut orchestrator = self.orchestrator.lock().await;
        if !orchestrator.player().is_listening(instance) {
            tracing::debug!(instance = instance.0, "Ended event without listener");
            return Ok(EndedOutcome::Stale);
        }
        let outcome = orchestrator.handle_ended(instance, cursor).inspect_err(|e| {
            tracing::warn!(error = %e, "Failed to advance playlist");
        })?;
        self.broadcast_cursor(&orchestrator, &outcome);
        Ok(outcome)
    }

    /// Advance as if the current clip ended.
    pub async fn skip(&self) -> Result<EndedOutcome, SessionError> {
        let mut orchestrator = self.orchestrator.lock().await;
        let outcome = orchestrator.skip()?;
        self.broadcast_cursor(&orchestrator, &outcome);
        Ok(outcome)
    }

    pub async fn clear(&self) {
        let snapshot = {
            let mut orchestrator = self.orchestrator.lock().await;
            orchestrator.clear();
            snapshot_of(&orchestrator)
        };
        self.broadcast(playlist_message(&snapshot));
    }

    pub async fn snapshot(&self) -> PlaylistSnapshot {
        snapshot_of(&*self.orchestrator.lock().await)
    }

    /// Messages that bring a newly connected overlay up to date.
    pub async fn sync_messages(&self) -> Vec<Value> {
        let orchestrator = self.orchestrator.lock().await;
        let snapshot = snapshot_of(&orchestrator);
        let mut messages = vec![playlist_message(&snapshot)];

        let current = snapshot.instance.zip(snapshot.playlist.current());
        if let Some((instance, entry)) = current {
            match clip_playlist::clip_slug(&entry.embed_url) {
                Ok(clip) => {
                    let config = orchestrator.player_config(clip);
                    messages.push(player_construct_message(instance, &config));
                }
                Err(e) => tracing::warn!(error = %e, "Cannot sync player"),
            }
        }
        messages
    }

    fn broadcast_cursor(&self, orchestrator: &PlaybackOrchestrator<WsPlayer>, outcome: &EndedOutcome) {
        if matches!(outcome, EndedOutcome::Advanced { .. } | EndedOutcome::Looped { .. }) {
            self.broadcast(json!({
                "type": "playlist_cursor",
                "data": { "cursor": orchestrator.playlist().cursor() },
            }));
        }
    }

    fn broadcast(&self, msg: Value) {
        let _ = self.ws_tx.send(msg.to_string());
    }
}

fn snapshot_of(orchestrator: &PlaybackOrchestrator<WsPlayer>) -> PlaylistSnapshot {
    PlaylistSnapshot {
        playlist: orchestrator.playlist().clone(),
        instance: orchestrator.instance(),
    }
}

fn playlist_message(snapshot: &PlaylistSnapshot) -> Value {
    json!({ "type": "playlist", "data": snapshot })
}
