//! Abstraction over the embedded clip player.

use serde::Serialize;
use url::Url;

use crate::PlaylistError;

/// Handle of one constructed player instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceId(pub u64);

/// Arguments the embed player is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerConfig {
    pub width: u32,
    pub height: u32,
    pub clip: String,
    pub parent: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Unknown player instance {0:?}")]
    UnknownInstance(InstanceId),
}

/// The embedded player as seen by the orchestrator.
///
/// Ended notifications for an instance are delivered back to the
/// orchestrator by whoever owns the event source, tagged with the instance
/// they belong to.
pub trait PlayerWidget {
    fn construct(&mut self, config: PlayerConfig) -> Result<InstanceId, PlayerError>;

    /// Start listening for the instance's ENDED event.
    fn on_ended(&mut self, instance: InstanceId) -> Result<(), PlayerError>;

    fn remove_ended_listener(&mut self, instance: InstanceId);

    /// Point an existing instance at another clip.
    fn load_clip(&mut self, instance: InstanceId, clip: &str) -> Result<(), PlayerError>;

    fn destroy(&mut self, instance: InstanceId);
}

/// Extract the clip slug from an embed URL.
///
/// The `clip` query parameter wins; otherwise the last path segment is used
/// (`https://clips.twitch.tv/<slug>`). A bare `/embed` path has no slug.
pub fn clip_slug(embed_url: &str) -> Result<String, PlaylistError> {
    let missing = || PlaylistError::MissingSlug(embed_url.to_string());
    let url = Url::parse(embed_url)
        .map_err(|e| PlaylistError::InvalidEmbedUrl(embed_url.to_string(), e))?;

    if let Some((_, clip)) = url.query_pairs().find(|(k, _)| k == "clip") {
        return if clip.is_empty() {
            Err(missing())
        } else {
            Ok(clip.into_owned())
        };
    }

    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .filter(|segment| *segment != "embed")
        .map(str::to_string)
        .ok_or_else(missing)
}
