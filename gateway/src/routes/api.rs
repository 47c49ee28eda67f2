use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, incoming_call};
use crate::state::AppState;
use std::sync::Arc;

/// Create the HTTP router
///
/// The telephony provider calls `/incoming-call` when a call arrives, so
/// both GET and POST are accepted there.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route(
            "/incoming-call",
            get(incoming_call::incoming_call).post(incoming_call::incoming_call),
        )
        .layer(TraceLayer::new_for_http())
}
