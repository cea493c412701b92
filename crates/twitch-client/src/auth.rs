//! App access token management for Twitch authentication.
//!
//! Exchanges client credentials for a bearer token and keeps it in
//! memory until it is about to expire.

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{Token, TwitchError};

pub const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 5 * 60;

/// Lifetime assumed when the endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Twitch OAuth token response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Twitch OAuth error response.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

/// Client credentials and the endpoint they are exchanged at.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

/// Manages the app access token for the session.
///
/// A new token is requested only when none is cached or the cached one
/// is within the expiry margin. Failures propagate to the caller.
pub struct TwitchAuth {
    credentials: Credentials,
    http: reqwest::Client,
    cached: Mutex<Option<Token>>,
}

impl TwitchAuth {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_http(credentials, reqwest::Client::new())
    }

    pub fn with_http(credentials: Credentials, http: reqwest::Client) -> Self {
        Self {
            credentials,
            http,
            cached: Mutex::new(None),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    /// Return the cached token, or fetch a new one if absent or expired.
    pub async fn acquire_token(&self) -> Result<Token, TwitchError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_expired(EXPIRY_MARGIN_SECS) {
                return Ok(token.clone());
            }
            tracing::info!(
                expires_at = token.expires_at,
                "App access token expiring, requesting a new one"
            );
        }

        let token = self.request_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token so the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        if self.cached.lock().await.take().is_some() {
            tracing::warn!("Cached app access token invalidated");
        }
    }

    /// POST the client credentials grant to the token endpoint.
    async fn request_token(&self) -> Result<Token, TwitchError> {
        tracing::debug!(url = %self.credentials.token_url, "Requesting app access token");

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let resp = self
            .http
            .post(&self.credentials.token_url)
            .form(&params)
            .send()
            .await?;

        parse_token_response(resp).await
    }
}

/// Parse the token endpoint response into a `Token`.
async fn parse_token_response(resp: reqwest::Response) -> Result<Token, TwitchError> {
    let status = resp.status();
    let body = resp.text().await?;
    token_from_body(status, &body)
}

fn token_from_body(status: reqwest::StatusCode, body: &str) -> Result<Token, TwitchError> {
    if !status.is_success() {
        let err: ErrorResponse = serde_json::from_str(body).unwrap_or(ErrorResponse {
            status: Some(status.as_u16()),
            message: Some(body.to_string()),
        });
        return Err(TwitchError::TokenRequestFailed(format!(
            "{}: {}",
            err.status.unwrap_or(status.as_u16()),
            err.message.unwrap_or_default()
        )));
    }

    let token_resp: TokenResponse = serde_json::from_str(body)
        .map_err(|e| TwitchError::TokenRequestFailed(format!("failed to parse response: {e}")))?;

    if token_resp.access_token.is_empty() {
        return Err(TwitchError::TokenRequestFailed(
            "token endpoint returned an empty access_token".into(),
        ));
    }

    let expires_in = token_resp.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);

    Ok(Token {
        access_token: token_resp.access_token,
        token_type: token_resp.token_type.unwrap_or_else(|| "bearer".into()),
        expires_at: Utc::now().timestamp() + expires_in,
    })
}
