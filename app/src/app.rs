use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use twitch_client::api::TwitchApiClient;
use twitch_client::{Credentials, TwitchAuth};

use crate::config::AppConfig;
use crate::services::session::ClipSession;

/// Application shared state accessible from axum handlers and background tasks.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for WebSocket messages
    ws_tx: broadcast::Sender<String>,
    config: AppConfig,
    session: ClipSession,
    shutdown: CancellationToken,
}

impl SharedState {
    /// Build the Twitch client and clip session from a loaded config.
    pub fn new(config: AppConfig) -> Self {
        let (ws_tx, _) = broadcast::channel(256);

        let credentials = Credentials::new(&config.client_id, &config.client_secret)
            .with_token_url(&config.token_url);
        let auth = Arc::new(TwitchAuth::new(credentials));
        let api = TwitchApiClient::with_base_url(auth, &config.helix_base_url);
        let session = ClipSession::new(api, &config, ws_tx.clone());

        Self {
            inner: Arc::new(SharedStateInner {
                ws_tx,
                config,
                session,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &ClipSession {
        &self.inner.session
    }

    pub fn ws_sender(&self) -> &broadcast::Sender<String> {
        &self.inner.ws_tx
    }

    pub fn subscribe_ws(&self) -> broadcast::Receiver<String> {
        self.inner.ws_tx.subscribe()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }
}
