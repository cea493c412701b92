pub mod session;
pub mod ws_player;
