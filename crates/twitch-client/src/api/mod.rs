//! Twitch Helix REST API client.
//!
//! Provides typed access to the clip and game endpoints with automatic
//! app token acquisition and Bearer token + Client-ID header injection.
//! A 401 drops the cached token; the failed call is not retried.

mod clips;
mod games;
mod request;

pub mod models;

pub use clips::DEFAULT_CLIP_COUNT;
pub use models::{ClipRecord, Game, HelixResponse};

use std::sync::Arc;

use crate::TwitchError;
use crate::auth::TwitchAuth;

pub const HELIX_BASE: &str = "https://api.twitch.tv/helix";

/// Twitch Helix API client with automatic auth header injection.
pub struct TwitchApiClient {
    pub(super) http: reqwest::Client,
    pub(super) auth: Arc<TwitchAuth>,
    pub(super) base_url: String,
}
