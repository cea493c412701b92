//! Runtime application configuration loaded from the environment.

use clip_playlist::EndBehavior;
use twitch_client::api::{DEFAULT_CLIP_COUNT, HELIX_BASE};
use twitch_client::auth::DEFAULT_TOKEN_URL;

use super::validation::validate_setting;

/// Runtime configuration populated from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub helix_base_url: String,
    pub parent_domain: String,
    pub broadcaster_id: String,
    pub clip_count: u32,
    pub shuffle: bool,
    pub loop_playlist: bool,
    pub player_width: u32,
    pub player_height: u32,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: DEFAULT_TOKEN_URL.into(),
            helix_base_url: HELIX_BASE.into(),
            parent_domain: "localhost".into(),
            broadcaster_id: String::new(),
            clip_count: DEFAULT_CLIP_COUNT,
            shuffle: false,
            loop_playlist: false,
            player_width: 1280,
            player_height: 720,
            server_port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Self {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`. Invalid values fall back to
    /// defaults with a warning.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let g = |key: &str| -> Option<String> {
            let value = lookup(key)?.trim().to_string();
            if value.is_empty() {
                return None;
            }
            match validate_setting(key, &value) {
                Ok(()) => Some(value),
                Err(e) => {
                    tracing::warn!(key, value = %value, "Invalid setting ignored: {e}");
                    None
                }
            }
        };

        Self {
            client_id: g("CLIENT_ID").unwrap_or_default(),
            client_secret: g("CLIENT_SECRET").unwrap_or_default(),
            token_url: g("TOKEN_URL").unwrap_or(defaults.token_url),
            helix_base_url: g("HELIX_BASE_URL").unwrap_or(defaults.helix_base_url),
            parent_domain: g("PARENT_DOMAIN").unwrap_or(defaults.parent_domain),
            broadcaster_id: g("BROADCASTER_ID").unwrap_or_default(),
            clip_count: parse_or(g("CLIP_COUNT"), defaults.clip_count),
            shuffle: g("SHUFFLE").is_some_and(|v| v == "true"),
            loop_playlist: g("LOOP_PLAYLIST").is_some_and(|v| v == "true"),
            player_width: parse_or(g("PLAYER_WIDTH"), defaults.player_width),
            player_height: parse_or(g("PLAYER_HEIGHT"), defaults.player_height),
            server_port: parse_or(g("SERVER_PORT"), defaults.server_port),
        }
    }

    /// Names of required settings that are not set.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.client_id.is_empty() {
            missing.push("CLIENT_ID");
        }
        if self.client_secret.is_empty() {
            missing.push("CLIENT_SECRET");
        }
        missing
    }

    pub fn end_behavior(&self) -> EndBehavior {
        if self.loop_playlist {
            EndBehavior::Loop
        } else {
            EndBehavior::Stop
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::load_from(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]);
        assert_eq!(config.token_url, "https://id.twitch.tv/oauth2/token");
        assert_eq!(config.helix_base_url, "https://api.twitch.tv/helix");
        assert_eq!(config.parent_domain, "localhost");
        assert_eq!(config.clip_count, 10);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.end_behavior(), EndBehavior::Stop);
        assert_eq!(config.missing_settings(), vec!["CLIENT_ID", "CLIENT_SECRET"]);
    }

    #[test]
    fn values_are_read_and_parsed() {
        let config = load(&[
            ("CLIENT_ID", "abc"),
            ("CLIENT_SECRET", "shh"),
            ("PARENT_DOMAIN", "clips.example.com"),
            ("BROADCASTER_ID", " 141981764 "),
            ("CLIP_COUNT", "25"),
            ("SHUFFLE", "true"),
            ("LOOP_PLAYLIST", "true"),
            ("SERVER_PORT", "9000"),
        ]);
        assert!(config.missing_settings().is_empty());
        assert_eq!(config.parent_domain, "clips.example.com");
        assert_eq!(config.broadcaster_id, "141981764");
        assert_eq!(config.clip_count, 25);
        assert!(config.shuffle);
        assert_eq!(config.end_behavior(), EndBehavior::Loop);
        assert_eq!(config.server_port, 9000);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = load(&[
            ("CLIP_COUNT", "500"),
            ("PARENT_DOMAIN", "https://bad"),
            ("SHUFFLE", "maybe"),
            ("BROADCASTER_ID", "name"),
        ]);
        assert_eq!(config.clip_count, 10);
        assert_eq!(config.parent_domain, "localhost");
        assert!(!config.shuffle);
        assert!(config.broadcaster_id.is_empty());
    }
}
