// Adapters - External system implementations

pub mod http_service;
pub mod scripted_service;
pub mod sim_player;
pub mod toml_config;

// Re-export adapters
pub use http_service::HttpClipService;
pub use scripted_service::ScriptedClipService;
pub use sim_player::SimulatedPlayer;
pub use toml_config::{ServiceConfig, TomlConfigAdapter};
