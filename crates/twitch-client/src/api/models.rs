use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Wrapper for Twitch Helix collection responses.
///
/// A missing or null `data` field deserializes as an empty list.
#[derive(Debug, Deserialize)]
pub struct HelixResponse<T> {
    #[serde(
        default = "Vec::new",
        deserialize_with = "null_as_empty",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub data: Vec<T>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Clip from GET /helix/clips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipRecord {
    pub id: String,
    pub embed_url: String,
    pub title: String,
    #[serde(default)]
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub broadcaster_id: String,
    #[serde(default)]
    pub broadcaster_name: String,
    #[serde(default)]
    pub creator_id: String,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub duration: f64,
}

/// Game (category) from GET /helix/games and /helix/games/top.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Game {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub box_art_url: String,
}
