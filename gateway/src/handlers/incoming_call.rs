//! Call-setup markup for the telephony provider.
//!
//! The provider fetches this document when a call arrives and then opens
//! the media-stream websocket it points at.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};
use url::{Host, Url};

use crate::state::AppState;

const XML_CONTENT_TYPE: &str = "application/xml";

/// Path the telephony provider streams call audio to.
pub const MEDIA_STREAM_PATH: &str = "/media-stream";

/// Answer an incoming call by connecting it to the media stream.
pub async fn incoming_call(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let host = state.config.public_host.clone().or_else(|| {
        headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    });
    let host = host.unwrap_or_else(|| state.config.address());

    let Some(url) = stream_url(&host) else {
        warn!(host = %host, "Rejecting incoming call with an invalid host");
        return (StatusCode::BAD_REQUEST, "Invalid host").into_response();
    };

    info!(url = %url, "Incoming call, connecting media stream");

    (
        [(header::CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE))],
        connect_markup(&url),
    )
        .into_response()
}

/// Media-stream URL for `host`, or `None` unless `host` is a plain
/// hostname or IP address with an optional port.
pub fn stream_url(host: &str) -> Option<Url> {
    let url = Url::parse(&format!("wss://{host}{MEDIA_STREAM_PATH}")).ok()?;

    let plain_host = match url.host()? {
        Host::Domain(domain) => domain.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        }),
        Host::Ipv4(_) | Host::Ipv6(_) => true,
    };
    let plain_url = url.path() == MEDIA_STREAM_PATH
        && url.username().is_empty()
        && url.password().is_none()
        && url.query().is_none()
        && url.fragment().is_none();

    (plain_host && plain_url).then_some(url)
}

/// TwiML `<Connect><Stream>` document pointing at `url`.
pub fn connect_markup(url: &Url) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Response><Connect><Stream url="{url}"/></Connect></Response>"#
    )
}
