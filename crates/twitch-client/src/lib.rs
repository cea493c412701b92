//! Twitch integration client library.
//!
//! Provides app-access-token acquisition (client credentials flow)
//! and a typed Helix REST client for clips and games.

pub mod api;
pub mod auth;

#[cfg(any(test, feature = "test-util"))]
pub mod fake_helix;

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub use auth::{Credentials, TwitchAuth};

/// App access token with its absolute expiry (unix seconds).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: i64,
}

impl Token {
    /// True when the token expires within `margin_secs` from now.
    pub fn is_expired(&self, margin_secs: i64) -> bool {
        Utc::now().timestamp() >= self.expires_at - margin_secs
    }
}

/// Unified error type for the twitch-client crate.
#[derive(Debug, thiserror::Error)]
pub enum TwitchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token request failed: {0}")]
    TokenRequestFailed(String),

    #[error("Twitch API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl TwitchError {
    /// Whether the error is a 401 from Helix.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TwitchError::ApiError { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_expiry_respects_margin() {
        let token = Token {
            access_token: "abc".into(),
            token_type: "bearer".into(),
            expires_at: Utc::now().timestamp() + 120,
        };
        assert!(!token.is_expired(60));
        assert!(token.is_expired(300));
    }

    #[test]
    fn unauthorized_only_matches_401() {
        let unauthorized = TwitchError::ApiError {
            status: 401,
            message: "unauthorized".into(),
        };
        let forbidden = TwitchError::ApiError {
            status: 403,
            message: "forbidden".into(),
        };
        assert!(unauthorized.is_unauthorized());
        assert!(!forbidden.is_unauthorized());
        assert!(!TwitchError::TokenRequestFailed("x".into()).is_unauthorized());
    }
}
