use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::relay::RelayConfig;

/// Shared application state handed to every route.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    relay: Arc<RelayConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let relay = Arc::new(config.relay.clone());
        Arc::new(Self { config, relay })
    }

    /// Relay settings shared by every call.
    pub fn relay_config(&self) -> Arc<RelayConfig> {
        Arc::clone(&self.relay)
    }
}
