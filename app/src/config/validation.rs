//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(localhost|([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63})$")
        .unwrap()
});
static RE_NUMERIC_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{1,20}$").unwrap());
static RE_HTTP_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://\S+$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "PARENT_DOMAIN" => {
            if !RE_DOMAIN.is_match(value) {
                return Err("must be a bare host name (no scheme or port)".into());
            }
        }
        "BROADCASTER_ID" => {
            if !value.is_empty() && !RE_NUMERIC_ID.is_match(value) {
                return Err("must be a numeric Twitch user id".into());
            }
        }
        "TOKEN_URL" | "HELIX_BASE_URL" => {
            if !RE_HTTP_URL.is_match(value) {
                return Err("must be an http(s) URL".into());
            }
        }
        "CLIP_COUNT" => validate_int_range(value, 1, 100)?,
        "PLAYER_WIDTH" => validate_int_range(value, 320, 7680)?,
        "PLAYER_HEIGHT" => validate_int_range(value, 180, 4320)?,
        "SERVER_PORT" => validate_int_range(value, 1, 65535)?,
        // Boolean settings
        k if is_boolean_setting(k) => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn is_boolean_setting(key: &str) -> bool {
    matches!(key, "SHUFFLE" | "LOOP_PLAYLIST")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_boolean() {
        assert!(validate_setting("SHUFFLE", "true").is_ok());
        assert!(validate_setting("LOOP_PLAYLIST", "false").is_ok());
        assert!(validate_setting("SHUFFLE", "yes").is_err());
    }

    #[test]
    fn test_valid_parent_domain() {
        assert!(validate_setting("PARENT_DOMAIN", "localhost").is_ok());
        assert!(validate_setting("PARENT_DOMAIN", "clips.example.com").is_ok());
        assert!(validate_setting("PARENT_DOMAIN", "https://example.com").is_err());
        assert!(validate_setting("PARENT_DOMAIN", "example.com:8080").is_err());
        assert!(validate_setting("PARENT_DOMAIN", "").is_err());
    }

    #[test]
    fn test_valid_broadcaster_id() {
        assert!(validate_setting("BROADCASTER_ID", "141981764").is_ok());
        assert!(validate_setting("BROADCASTER_ID", "").is_ok()); // empty is ok
        assert!(validate_setting("BROADCASTER_ID", "twitchdev").is_err());
    }

    #[test]
    fn test_valid_ranges() {
        assert!(validate_setting("CLIP_COUNT", "1").is_ok());
        assert!(validate_setting("CLIP_COUNT", "100").is_ok());
        assert!(validate_setting("CLIP_COUNT", "0").is_err());
        assert!(validate_setting("CLIP_COUNT", "101").is_err());
        assert!(validate_setting("SERVER_PORT", "abc").is_err());
    }

    #[test]
    fn test_valid_urls() {
        assert!(validate_setting("TOKEN_URL", "https://id.twitch.tv/oauth2/token").is_ok());
        assert!(validate_setting("HELIX_BASE_URL", "http://127.0.0.1:9000/helix").is_ok());
        assert!(validate_setting("TOKEN_URL", "id.twitch.tv").is_err());
    }
}
