//! Configuration validation logic.

use url::Url;

use crate::core::relay::RelayConfig;

/// The realtime API key must be present and non-empty.
pub(super) fn validate_api_key(api_key: &str) -> Result<(), Box<dyn std::error::Error>> {
    if api_key.trim().is_empty() {
        return Err(
            "OPENAI_API_KEY is required (set the env var or openai.api_key in the config file)"
                .into(),
        );
    }
    Ok(())
}

/// The realtime endpoint must be a WebSocket URL.
pub(super) fn validate_realtime_url(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Url::parse(url).map_err(|e| format!("Invalid realtime URL '{url}': {e}"))?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(()),
        scheme => Err(format!("Realtime URL must use ws or wss, got '{scheme}'").into()),
    }
}

pub(super) fn validate_relay(relay: &RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    relay
        .validate()
        .map_err(|e| format!("Invalid relay configuration: {e}"))?;
    Ok(())
}
