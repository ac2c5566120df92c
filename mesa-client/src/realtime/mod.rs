//! Push event stream
//!
//! The server pushes [`shared::EventFrame`] updates over a length-prefixed
//! TCP stream. [`EventClient`] decodes frames into [`shared::PushEvent`]s
//! and fans them out on a broadcast channel. The transport is swappable so
//! tests can drive the client from an in-process channel pair.

mod client;
mod transport;

pub use client::EventClient;
pub use transport::{EventTransport, MemoryEventTransport, TcpEventTransport};

use shared::event::EventDecodeError;
use thiserror::Error;

/// Event stream error type
#[derive(Debug, Error)]
pub enum EventError {
    /// Connection failed or dropped
    #[error("Connection error: {0}")]
    Connection(String),

    /// IO error on the stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame could not be decoded
    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] serde_json::Error),

    /// Frame decoded but named no known event
    #[error(transparent)]
    Decode(#[from] EventDecodeError),
}
