//! Turns raw Helix clip records into playlist entries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use twitch_client::api::{ClipRecord, Game};
use url::Url;

/// Game name used when a clip's game id cannot be resolved.
pub const UNKNOWN_GAME: &str = "Unknown";

/// One playable clip as presented to the overlay.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlaylistEntry {
    pub clip_id: String,
    /// Embed URL including the `parent` parameter the player requires.
    pub embed_url: String,
    pub title: String,
    pub author: String,
    pub uploaded_at: DateTime<Utc>,
    pub game_id: String,
    pub game_name: String,
    pub view_count: u64,
    pub duration: f64,
    pub thumbnail_url: String,
}

/// Map of game id to display name.
pub fn game_names(games: &[Game]) -> HashMap<String, String> {
    games
        .iter()
        .map(|g| (g.id.clone(), g.name.clone()))
        .collect()
}

pub struct PlaylistBuilder {
    parent_domain: String,
}

impl PlaylistBuilder {
    pub fn new(parent_domain: impl Into<String>) -> Self {
        Self {
            parent_domain: parent_domain.into(),
        }
    }

    /// Build one entry per clip, in input order.
    pub fn build(
        &self,
        clips: &[ClipRecord],
        game_names: &HashMap<String, String>,
    ) -> Vec<PlaylistEntry> {
        clips
            .iter()
            .map(|clip| PlaylistEntry {
                clip_id: clip.id.clone(),
                embed_url: self.with_parent(&clip.embed_url),
                title: clip.title.clone(),
                author: clip.creator_name.clone(),
                uploaded_at: clip.created_at,
                game_id: clip.game_id.clone(),
                game_name: game_names
                    .get(&clip.game_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_GAME.to_string()),
                view_count: clip.view_count,
                duration: clip.duration,
                thumbnail_url: clip.thumbnail_url.clone(),
            })
            .collect()
    }

    /// Shuffle a copy of the clips, then build.
    pub fn build_shuffled<R: Rng + ?Sized>(
        &self,
        clips: &[ClipRecord],
        game_names: &HashMap<String, String>,
        rng: &mut R,
    ) -> Vec<PlaylistEntry> {
        let mut shuffled = clips.to_vec();
        shuffled.shuffle(rng);
        self.build(&shuffled, game_names)
    }

    /// Append `parent=<domain>` unless the URL already carries it.
    fn with_parent(&self, embed_url: &str) -> String {
        let mut url = match Url::parse(embed_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(embed_url, error = %e, "Unparseable embed URL, leaving as-is");
                return embed_url.to_string();
            }
        };

        let present = url
            .query_pairs()
            .any(|(k, v)| k == "parent" && v == self.parent_domain.as_str());
        if !present {
            url.query_pairs_mut()
                .append_pair("parent", &self.parent_domain);
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn clip(id: &str, game_id: &str) -> ClipRecord {
        ClipRecord {
            id: id.to_string(),
            embed_url: format!("https://clips.twitch.tv/embed?clip={id}"),
            title: format!("title {id}"),
            creator_name: "clipper".into(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            game_id: game_id.to_string(),
            url: String::new(),
            broadcaster_id: "1234".into(),
            broadcaster_name: "caster".into(),
            creator_id: String::new(),
            video_id: String::new(),
            language: "en".into(),
            view_count: 3,
            thumbnail_url: String::new(),
            duration: 30.0,
        }
    }

    fn names() -> HashMap<String, String> {
        game_names(&[Game {
            id: "1".into(),
            name: "Chess".into(),
            box_art_url: String::new(),
        }])
    }

    #[test]
    fn build_keeps_length_and_resolves_names() {
        let clips = vec![clip("a", "1"), clip("b", "2"), clip("c", "")];
        let entries = PlaylistBuilder::new("localhost").build(&clips, &names());

        assert_eq!(entries.len(), clips.len());
        assert_eq!(entries[0].game_name, "Chess");
        assert_eq!(entries[1].game_name, UNKNOWN_GAME);
        assert_eq!(entries[2].game_name, UNKNOWN_GAME);
        assert_eq!(entries[0].author, "clipper");
        assert_eq!(entries[0].uploaded_at, clips[0].created_at);
    }

    #[test]
    fn parent_is_appended_to_embed_url() {
        let entries = PlaylistBuilder::new("example.com").build(&[clip("AbC123", "1")], &names());
        assert_eq!(
            entries[0].embed_url,
            "https://clips.twitch.tv/embed?clip=AbC123&parent=example.com"
        );
    }

    #[test]
    fn existing_parent_is_not_duplicated() {
        let mut c = clip("a", "1");
        c.embed_url = "https://clips.twitch.tv/embed?clip=a&parent=example.com".into();
        let entries = PlaylistBuilder::new("example.com").build(&[c.clone()], &names());
        assert_eq!(entries[0].embed_url, c.embed_url);
    }

    #[test]
    fn unparseable_embed_url_is_kept() {
        let mut c = clip("a", "1");
        c.embed_url = "not a url".into();
        let entries = PlaylistBuilder::new("example.com").build(&[c], &names());
        assert_eq!(entries[0].embed_url, "not a url");
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let clips: Vec<ClipRecord> = (0..20).map(|i| clip(&format!("c{i}"), "1")).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let entries = PlaylistBuilder::new("localhost").build_shuffled(&clips, &names(), &mut rng);

        let mut got: Vec<&str> = entries.iter().map(|e| e.clip_id.as_str()).collect();
        let mut want: Vec<&str> = clips.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(got.len(), want.len());
        got.sort_unstable();
        want.sort_unstable();
        assert_eq!(got, want);
    }

    #[test]
    fn shuffle_of_single_clip_is_unchanged() {
        let clips = vec![clip("only", "1")];
        let mut rng = StdRng::seed_from_u64(1);
        let builder = PlaylistBuilder::new("localhost");

        assert_eq!(
            builder.build_shuffled(&clips, &names(), &mut rng),
            builder.build(&clips, &names())
        );
        assert!(builder.build_shuffled(&[], &names(), &mut rng).is_empty());
    }
}
