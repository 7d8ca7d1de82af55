// lumen-api: Async Rust client for a lighting bridge control facade (HTTP + mirror socket)

pub mod client;
pub mod error;
pub mod models;
pub mod reconnect;
pub mod transport;
pub mod websocket;

mod configurations;
mod lights;
mod mirror;
mod positions;

pub use client::BridgeClient;
pub use error::Error;
pub use reconnect::{ChannelEffect, ChannelEvent, ChannelMachine, ChannelState, ReconnectPolicy};
pub use transport::{TlsMode, TransportConfig};
pub use websocket::MirrorChannel;
