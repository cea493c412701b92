use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use clip_playlist::InstanceId;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::app::SharedState;

/// Messages the overlay page sends to the server.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Ping,
    ClipEnded { data: ClipEnded },
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
struct ClipEnded {
    instance: u64,
    /// Playlist cursor of the clip that ended.
    cursor: usize,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.subscribe_ws();

    // Send connection confirmation
    let client_id = uuid::Uuid::new_v4().to_string();
    let welcome = serde_json::json!({
        "type": "connected",
        "data": { "clientId": client_id }
    });
    if sender
        .send(Message::Text(welcome.to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    // Bring the new overlay up to date with the current playlist and player.
    for msg in state.session().sync_messages().await {
        if sender.send(Message::Text(msg.to_string().into())).await.is_err() {
            return;
        }
    }

    tracing::info!("WebSocket client connected: {}", client_id);

    // Forward broadcast messages to this client
    let mut send_task = tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive messages from this client and handle routing
    let recv_state = state.clone();
    let cid = client_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_client_message(&text, &recv_state).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
        tracing::info!("WebSocket client disconnected: {}", cid);
    });

    let shutdown = state.shutdown_token().clone();
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
        _ = shutdown.cancelled() => {
            send_task.abort();
            recv_task.abort();
        }
    }
}

fn parse_client_message(text: &str) -> Option<ClientMessage> {
    match serde_json::from_str(text) {
        Ok(msg) => Some(msg),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unrecognised WebSocket message");
            None
        }
    }
}

/// Route incoming client messages.
async fn handle_client_message(text: &str, state: &SharedState) {
    match parse_client_message(text) {
        Some(ClientMessage::Ping) => {
            let pong = serde_json::json!({ "type": "pong" });
            let _ = state.ws_sender().send(pong.to_string());
        }
        Some(ClientMessage::ClipEnded {
            data: ClipEnded { instance, cursor },
        }) => {
            if let Err(e) = state
                .session()
                .clip_ended(InstanceId(instance), cursor)
                .await
            {
                tracing::warn!(instance, "Failed to handle clip end: {e}");
            }
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clip_ended() {
        assert_eq!(
            parse_client_message(r#"{"type":"clip_ended","data":{"instance":3,"cursor":1}}"#),
            Some(ClientMessage::ClipEnded {
                data: ClipEnded {
                    instance: 3,
                    cursor: 1
                }
            })
        );
    }

    #[test]
    fn parses_ping_without_data() {
        assert_eq!(
            parse_client_message(r#"{"type":"ping"}"#),
            Some(ClientMessage::Ping)
        );
    }

    #[test]
    fn ignores_unknown_and_malformed() {
        assert_eq!(parse_client_message(r#"{"type":"mystery"}"#), None);
        assert_eq!(parse_client_message("not json"), None);
        assert_eq!(
            parse_client_message(r#"{"type":"clip_ended","data":{}}"#),
            None
        );
        assert_eq!(
            parse_client_message(r#"{"type":"clip_ended","data":{"instance":3}}"#),
            None
        );
    }
}
