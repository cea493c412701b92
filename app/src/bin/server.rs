//! Clip rotator server.
//!
//! Starts the axum web server, the initial clip load, and signal handling.

use tracing_subscriber::EnvFilter;

use clip_rotator_lib::app::SharedState;
use clip_rotator_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting clip rotator");

    let config = clip_rotator_lib::init_config()?;
    let state = SharedState::new(config);

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let s = state.clone();
    tokio::spawn(async move { clip_rotator_lib::initial_load(s).await });

    tracing::info!(
        port = state.server_port(),
        "Server running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    state.shutdown_token().cancel();
    if let Err(e) = server_handle.await {
        tracing::warn!("Server task ended abnormally: {e}");
    }
    Ok(())
}
