//! Shared types for realtime AI peers.

use thiserror::Error;

use super::openai::ServerEvent;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while talking to a realtime AI peer.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Connection to the provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for realtime operations.
pub type RealtimeResult<T> = Result<T, RealtimeError>;

impl From<serde_json::Error> for RealtimeError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

// =============================================================================
// Connection Signals
// =============================================================================

/// What a realtime connection task reports back to its owner.
#[derive(Debug, Clone)]
pub enum RealtimeSignal {
    /// Transport is up and the session configuration has been sent
    Connected,
    /// A parsed server event
    Event(ServerEvent),
    /// Transport is gone; `None` when the close was requested locally
    Closed { reason: Option<String> },
}
