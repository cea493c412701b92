//! Clip playlist core: shaping fetched clips into a playlist, the game
//! filter widget, and the playback orchestrator that drives an embedded
//! player through an injected [`PlayerWidget`].

pub mod builder;
pub mod filter;
pub mod orchestrator;
pub mod player;
pub mod playlist;
pub mod sequence;

pub use builder::{PlaylistBuilder, PlaylistEntry, UNKNOWN_GAME, game_names};
pub use filter::{FilterState, GameFilter, GameSelection};
pub use orchestrator::{EndBehavior, EndedOutcome, PlaybackOrchestrator};
pub use player::{InstanceId, PlayerConfig, PlayerError, PlayerWidget, clip_slug};
pub use playlist::Playlist;
pub use sequence::{RequestSequencer, RequestTicket};

#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("Embed URL has no clip slug: {0}")]
    MissingSlug(String),

    #[error("Invalid embed URL {0}: {1}")]
    InvalidEmbedUrl(String, url::ParseError),

    #[error("Player error: {0}")]
    Player(#[from] PlayerError),
}
