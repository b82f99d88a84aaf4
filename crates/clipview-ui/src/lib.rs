pub mod app;
pub mod audio_player;
pub mod backend;
pub mod error;
pub mod message;
pub mod preview;
