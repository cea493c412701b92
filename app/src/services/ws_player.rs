//! Embedded player driven over the overlay WebSocket.
//!
//! Player commands are broadcast to every connected overlay page, which
//! owns the actual Twitch embed. ENDED events come back as `clip_ended`
//! messages and are only honoured for instances with a live listener.

use std::collections::HashSet;

use clip_playlist::{InstanceId, PlayerConfig, PlayerError, PlayerWidget};
use serde_json::json;
use tokio::sync::broadcast;

pub struct WsPlayer {
    ws_tx: broadcast::Sender<String>,
    next_id: u64,
    live: HashSet<InstanceId>,
    listening: HashSet<InstanceId>,
}

impl WsPlayer {
    pub fn new(ws_tx: broadcast::Sender<String>) -> Self {
        Self {
            ws_tx,
            next_id: 0,
            live: HashSet::new(),
            listening: HashSet::new(),
        }
    }

    pub fn is_listening(&self, instance: InstanceId) -> bool {
        self.listening.contains(&instance)
    }

    fn send(&self, msg: serde_json::Value) {
        // No connected overlay is not an error; late joiners get a sync message.
        if self.ws_tx.send(msg.to_string()).is_err() {
            tracing::debug!("No overlay connected for player command");
        }
    }
}

impl PlayerWidget for WsPlayer {
    fn construct(&mut self, config: PlayerConfig) -> Result<InstanceId, PlayerError> {
        self.next_id += 1;
        let instance = InstanceId(self.next_id);
        self.live.insert(instance);
        self.send(player_construct_message(instance, &config));
        Ok(instance)
    }

    fn on_ended(&mut self, instance: InstanceId) -> Result<(), PlayerError> {
        if !self.live.contains(&instance) {
            return Err(PlayerError::UnknownInstance(instance));
        }
        self.listening.insert(instance);
        Ok(())
    }

    fn remove_ended_listener(&mut self, instance: InstanceId) {
        self.listening.remove(&instance);
    }

    fn load_clip(&mut self, instance: InstanceId, clip: &str) -> Result<(), PlayerError> {
        if !self.live.contains(&instance) {
            return Err(PlayerError::UnknownInstance(instance));
        }
        self.send(json!({
            "type": "player_load",
            "data": { "instance": instance, "clip": clip },
        }));
        Ok(())
    }

    fn destroy(&mut self, instance: InstanceId) {
        if self.live.remove(&instance) {
            self.send(json!({
                "type": "player_destroy",
                "data": { "instance": instance },
            }));
        }
    }
}

pub fn player_construct_message(instance: InstanceId, config: &PlayerConfig) -> serde_json::Value {
    json!({
        "type": "player_construct",
        "data": { "instance": instance, "config": config },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn config(clip: &str) -> PlayerConfig {
        PlayerConfig {
            width: 1280,
            height: 720,
            clip: clip.to_string(),
            parent: vec!["localhost".into()],
        }
    }

    fn recv(rx: &mut broadcast::Receiver<String>) -> Value {
        serde_json::from_str(&rx.try_recv().unwrap()).unwrap()
    }

    #[test]
    fn construct_broadcasts_config() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut player = WsPlayer::new(tx);

        let instance = player.construct(config("AbC123")).unwrap();
        let msg = recv(&mut rx);

        assert_eq!(instance, InstanceId(1));
        assert_eq!(msg["type"], "player_construct");
        assert_eq!(msg["data"]["instance"], 1);
        assert_eq!(msg["data"]["config"]["clip"], "AbC123");
        assert_eq!(msg["data"]["config"]["parent"][0], "localhost");
    }

    #[test]
    fn listener_lifecycle() {
        let (tx, _rx) = broadcast::channel(16);
        let mut player = WsPlayer::new(tx);

        let instance = player.construct(config("a")).unwrap();
        assert!(!player.is_listening(instance));

        player.on_ended(instance).unwrap();
        assert!(player.is_listening(instance));

        player.remove_ended_listener(instance);
        assert!(!player.is_listening(instance));
    }

    #[test]
    fn destroyed_instance_rejects_commands() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut player = WsPlayer::new(tx);

        let instance = player.construct(config("a")).unwrap();
        player.destroy(instance);
        let _ = recv(&mut rx);
        assert_eq!(recv(&mut rx)["type"], "player_destroy");

        assert!(player.load_clip(instance, "b").is_err());
        assert!(player.on_ended(instance).is_err());

        // Second destroy is silent.
        player.destroy(instance);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn commands_without_overlay_do_not_fail() {
        let (tx, rx) = broadcast::channel(16);
        drop(rx);
        let mut player = WsPlayer::new(tx);

        let instance = player.construct(config("a")).unwrap();
        assert!(player.load_clip(instance, "b").is_ok());
    }
}
