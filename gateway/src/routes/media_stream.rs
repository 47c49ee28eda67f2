//! Media-stream WebSocket route configuration
//!
//! This module configures the WebSocket endpoint the telephony provider
//! streams call audio to.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::incoming_call::MEDIA_STREAM_PATH;
use crate::handlers::media_stream::media_stream_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the media-stream WebSocket router
///
/// # Endpoint
///
/// `GET /media-stream` - WebSocket upgrade for one call
///
/// # Protocol
///
/// The telephony provider sends JSON text frames (`connected`, `start`,
/// `media`, `mark`, `stop`). The gateway answers with `media`, `mark` and
/// `clear` frames carrying the AI reply audio.
///
/// # Example
///
/// ```json
/// // Provider sends
/// {"event": "start", "start": {"streamSid": "MZ...", "callSid": "CA..."}}
/// {"event": "media", "media": {"timestamp": "20", "payload": "/////w=="}}
///
/// // Gateway replies
/// {"event": "media", "streamSid": "MZ...", "media": {"payload": "..."}}
/// {"event": "mark", "streamSid": "MZ...", "mark": {"name": "reply-1"}}
/// ```
pub fn create_media_stream_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(MEDIA_STREAM_PATH, get(media_stream_handler))
        .layer(TraceLayer::new_for_http())
}
