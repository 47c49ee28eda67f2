//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `incoming_call` - Call-setup markup for the telephony provider
//! - `media_stream` - Media-stream WebSocket, one relay session per call

pub mod api;
pub mod incoming_call;
pub mod media_stream;

// Re-export commonly used handlers for convenient access
pub use incoming_call::incoming_call;
pub use media_stream::media_stream_handler;
