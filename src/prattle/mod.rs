//! Prattle server integration layer: REST directory client and WebSocket chat channel.

pub mod channel;
pub mod directory;

pub use channel::WebSocketConnector;
pub use directory::HttpDirectoryClient;

/// Returns the prattle module name for smoke checks.
pub fn module_name() -> &'static str {
    "prattle"
}
