pub mod api;
pub mod media_stream;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// Build the complete application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    api::create_api_router()
        .merge(media_stream::create_media_stream_router())
        .with_state(state)
}
