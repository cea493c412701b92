pub mod app;
pub mod config;
pub mod server;
pub mod services;

use config::AppConfig;
use services::session::ClipSource;

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load the environment and runtime config; fails when credentials are missing.
pub fn init_config() -> Result<AppConfig, anyhow::Error> {
    load_dotenv();

    let config = AppConfig::load();
    let missing = config.missing_settings();
    if !missing.is_empty() {
        anyhow::bail!("Missing required settings: {}", missing.join(", "));
    }

    tracing::info!(
        port = config.server_port,
        parent = %config.parent_domain,
        clip_count = config.clip_count,
        shuffle = config.shuffle,
        "Settings loaded"
    );
    Ok(config)
}

/// Fill the game list and, if a broadcaster is configured, the first playlist.
pub async fn initial_load(state: app::SharedState) {
    let session = state.session();

    if let Err(e) = session.refresh_games().await {
        tracing::warn!("Initial game list unavailable: {e}");
    }

    let broadcaster_id = state.config().broadcaster_id.clone();
    if broadcaster_id.is_empty() {
        tracing::info!("No BROADCASTER_ID configured, waiting for a selection");
        return;
    }

    match session.load(ClipSource::Broadcaster { broadcaster_id }).await {
        Ok(outcome) => tracing::info!(?outcome, "Initial playlist loaded"),
        Err(e) => tracing::warn!("Initial playlist unavailable: {e}"),
    }
}
