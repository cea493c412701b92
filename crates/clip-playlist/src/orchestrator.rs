//! Playback orchestrator: owns the playlist and the single player instance.

use serde::Serialize;

use crate::PlaylistError;
use crate::player::{InstanceId, PlayerConfig, PlayerWidget, clip_slug};
use crate::playlist::Playlist;

/// What happens when the last clip ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndBehavior {
    #[default]
    Stop,
    Loop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EndedOutcome {
    Advanced { index: usize, clip: String },
    Looped { clip: String },
    EndOfPlaylist,
    /// Notification from an instance that is no longer current, or for a
    /// clip the cursor has already moved past.
    Stale,
}

pub struct PlaybackOrchestrator<P> {
    player: P,
    playlist: Playlist,
    instance: Option<InstanceId>,
    width: u32,
    height: u32,
    parent_domain: String,
    end_behavior: EndBehavior,
}

impl<P: PlayerWidget> PlaybackOrchestrator<P> {
    pub fn new(player: P, parent_domain: impl Into<String>) -> Self {
        Self {
            player,
            playlist: Playlist::default(),
            instance: None,
            width: 1280,
            height: 720,
            parent_domain: parent_domain.into(),
            end_behavior: EndBehavior::Stop,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_end_behavior(mut self, end_behavior: EndBehavior) -> Self {
        self.end_behavior = end_behavior;
        self
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn instance(&self) -> Option<InstanceId> {
        self.instance
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Swap in a new playlist and rebuild the player on its first clip.
    ///
    /// An empty playlist clears playback. If the first entry has no slug the
    /// call is aborted and the current playlist and player stay in place.
    pub fn replace_playlist(
        &mut self,
        playlist: Playlist,
    ) -> Result<Option<InstanceId>, PlaylistError> {
        let Some(first) = playlist.current() else {
            self.teardown();
            self.playlist = playlist;
            tracing::info!("Playlist cleared");
            return Ok(None);
        };

        let clip = clip_slug(&first.embed_url).inspect_err(|e| {
            tracing::warn!(error = %e, "Playlist replacement aborted");
        })?;

        self.teardown();
        self.playlist = playlist;

        let instance = self.player.construct(self.player_config(clip.clone()))?;
        self.instance = Some(instance);
        if let Err(e) = self.player.on_ended(instance) {
            tracing::warn!(instance = instance.0, error = %e, "Ended listener rejected, destroying player");
            self.teardown();
            return Err(e.into());
        }

        tracing::info!(
            clips = self.playlist.len(),
            clip = %clip,
            instance = instance.0,
            "Playlist replaced"
        );
        Ok(Some(instance))
    }

    /// Construction arguments for a player showing `clip`.
    pub fn player_config(&self, clip: String) -> PlayerConfig {
        PlayerConfig {
            width: self.width,
            height: self.height,
            clip,
            parent: vec![self.parent_domain.clone()],
        }
    }

    pub fn clear(&mut self) {
        self.teardown();
        self.playlist = Playlist::default();
    }

    /// React to the ENDED event of `instance` for the clip at `cursor`.
    ///
    /// Every overlay showing the player reports the same end; only the
    /// first report for the current cursor advances.
    pub fn handle_ended(
        &mut self,
        instance: InstanceId,
        cursor: usize,
    ) -> Result<EndedOutcome, PlaylistError> {
        let Some(current) = self.instance.filter(|current| *current == instance) else {
            tracing::debug!(instance = instance.0, "Ignoring ended event from stale player");
            return Ok(EndedOutcome::Stale);
        };
        if cursor != self.playlist.cursor() {
            tracing::debug!(
                instance = instance.0,
                cursor,
                current = self.playlist.cursor(),
                "Ignoring repeated ended event"
            );
            return Ok(EndedOutcome::Stale);
        }
        self.play_next(current)
    }

    /// Behave as if the current clip had ended.
    pub fn skip(&mut self) -> Result<EndedOutcome, PlaylistError> {
        match self.instance {
            Some(instance) => self.play_next(instance),
            None => Ok(EndedOutcome::EndOfPlaylist),
        }
    }

    /// Retarget the player at the next entry with a playable clip. The
    /// cursor only moves once the player has accepted the clip.
    fn play_next(&mut self, instance: InstanceId) -> Result<EndedOutcome, PlaylistError> {
        let from = self.playlist.cursor();
        let ahead = from + 1..self.playlist.len();
        let wrapped = match self.end_behavior {
            EndBehavior::Loop => 0..(from + 1).min(self.playlist.len()),
            EndBehavior::Stop => 0..0,
        };

        for index in ahead.chain(wrapped) {
            let clip = match clip_slug(&self.playlist.entries()[index].embed_url) {
                Ok(clip) => clip,
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping entry without a clip");
                    continue;
                }
            };
            self.player.load_clip(instance, &clip)?;
            self.playlist.seek(index);

            if index > from {
                tracing::info!(index, clip = %clip, "Advanced to next clip");
                return Ok(EndedOutcome::Advanced { index, clip });
            }
            tracing::info!(index, clip = %clip, "Playlist finished, looping");
            return Ok(EndedOutcome::Looped { clip });
        }

        tracing::info!("No more clips to play");
        Ok(EndedOutcome::EndOfPlaylist)
    }

    fn teardown(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.player.remove_ended_listener(instance);
            self.player.destroy(instance);
        }
    }
}
