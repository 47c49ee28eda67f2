//! OpenAI Realtime API client implementation.
//!
//! # API Reference
//!
//! - Endpoint: `wss://api.openai.com/v1/realtime?model=<model>`
//! - Protocol: WebSocket with JSON events
//! - Auth: `Authorization: Bearer <key>` on the upgrade request
//!
//! The client owns one WebSocket for the lifetime of a call. It is spawned as
//! a task that sends the session configuration, then multiplexes outgoing
//! [`ClientEvent`]s from a [`PeerLink`] with incoming [`ServerEvent`]s, which
//! are forwarded to the owner as [`RealtimeSignal`]s.

use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::{self, Message};
use url::Url;
use zeroize::Zeroizing;

use super::config::OpenAIRealtimeModel;
use super::messages::{ClientEvent, ServerEvent, SessionConfig};
use crate::core::link::{LinkCommand, LinkReceiver, PeerLink};
use crate::core::realtime::base::{RealtimeError, RealtimeResult, RealtimeSignal};

/// Channel capacity for WebSocket message sending.
const WS_CHANNEL_CAPACITY: usize = 256;

/// Upper bound on the WebSocket handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Peer name used by the link and in logs.
pub const AI_PEER: &str = "ai";

// =============================================================================
// OpenAI Realtime Client
// =============================================================================

/// OpenAI Realtime API client.
pub struct OpenAIRealtime {
    api_key: Zeroizing<String>,
    url: Url,
    session: SessionConfig,
}

impl std::fmt::Debug for OpenAIRealtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIRealtime")
            .field("url", &self.url.as_str())
            .field("model", &self.model())
            .finish_non_exhaustive()
    }
}

impl OpenAIRealtime {
    /// Create a client for the given endpoint and session configuration.
    pub fn new(api_key: &str, url: &str, session: SessionConfig) -> RealtimeResult<Self> {
        if api_key.is_empty() {
            return Err(RealtimeError::AuthenticationFailed(
                "API key is required".to_string(),
            ));
        }

        let url = Url::parse(url)
            .map_err(|e| RealtimeError::InvalidConfiguration(format!("Invalid URL {url}: {e}")))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(RealtimeError::InvalidConfiguration(format!(
                "Realtime URL must use ws or wss, got {}",
                url.scheme()
            )));
        }

        Ok(Self {
            api_key: Zeroizing::new(api_key.to_string()),
            url,
            session,
        })
    }

    /// Model requested for the session.
    pub fn model(&self) -> OpenAIRealtimeModel {
        self.session.model.unwrap_or_default()
    }

    /// Endpoint with the `model` query parameter applied.
    fn build_ws_url(&self) -> Url {
        let mut url = self.url.clone();
        if !url.query_pairs().any(|(key, _)| key == "model") {
            url.query_pairs_mut()
                .append_pair("model", self.model().as_str());
        }
        url
    }

    fn build_request(&self) -> RealtimeResult<Request> {
        let mut request = self
            .build_ws_url()
            .as_str()
            .into_client_request()
            .map_err(|e| RealtimeError::ConnectionFailed(e.to_string()))?;

        let bearer = Zeroizing::new(format!("Bearer {}", self.api_key.as_str()));
        let mut value = HeaderValue::from_str(&bearer)
            .map_err(|e| RealtimeError::InvalidConfiguration(format!("Invalid API key: {e}")))?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);

        Ok(request)
    }

    /// Spawn the connection task.
    ///
    /// Returns the link used to send events to the peer and the task handle.
    /// The task reports [`RealtimeSignal::Connected`] once the session
    /// configuration has been sent, every parsed server event, and finally
    /// exactly one [`RealtimeSignal::Closed`].
    pub fn spawn<E>(self, events: mpsc::Sender<E>) -> (PeerLink<ClientEvent>, JoinHandle<()>)
    where
        E: From<RealtimeSignal> + Send + 'static,
    {
        let (link, commands) = PeerLink::channel(AI_PEER, WS_CHANNEL_CAPACITY);
        let handle = tokio::spawn(self.run(commands, events));
        (link, handle)
    }

    async fn run<E>(self, mut commands: LinkReceiver<ClientEvent>, events: mpsc::Sender<E>)
    where
        E: From<RealtimeSignal> + Send + 'static,
    {
        let reason = match self.session_loop(&mut commands, &events).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("OpenAI Realtime connection ended: {}", e);
                Some(e.to_string())
            }
        };

        commands.mark_closed();
        let _ = events.send(RealtimeSignal::Closed { reason }.into()).await;
        tracing::info!("OpenAI Realtime connection task ended");
    }

    async fn session_loop<E>(
        &self,
        commands: &mut LinkReceiver<ClientEvent>,
        events: &mpsc::Sender<E>,
    ) -> RealtimeResult<()>
    where
        E: From<RealtimeSignal> + Send + 'static,
    {
        let request = self.build_request()?;

        let (ws_stream, _response) =
            tokio::time::timeout(CONNECT_TIMEOUT, tokio_tungstenite::connect_async(request))
                .await
                .map_err(|_| RealtimeError::ConnectionFailed("handshake timed out".to_string()))?
                .map_err(|e| RealtimeError::ConnectionFailed(e.to_string()))?;

        tracing::info!(model = %self.model(), "Connected to OpenAI Realtime API");

        let (mut ws_sink, mut ws_stream) = ws_stream.split();

        // The session must be configured before any audio is forwarded.
        let update = ClientEvent::SessionUpdate {
            session: self.session.clone(),
        };
        send_event(&mut ws_sink, &update).await?;

        commands.mark_open();
        if events.send(RealtimeSignal::Connected.into()).await.is_err() {
            return Ok(());
        }

        loop {
            tokio::select! {
                // Handle outgoing messages
                command = commands.recv() => match command {
                    Some(LinkCommand::Send(event)) => send_event(&mut ws_sink, &event).await?,
                    Some(LinkCommand::Close) | None => {
                        commands.mark_closed();
                        let _ = ws_sink.send(Message::Close(None)).await;
                        return Ok(());
                    }
                },

                // Handle incoming messages
                message = ws_stream.next() => match message {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => {
                                tracing::trace!(event = event.kind(), "OpenAI Realtime event");
                                if events.send(RealtimeSignal::Event(event).into()).await.is_err() {
                                    return Ok(());
                                }
                            }
                            Err(e) => {
                                tracing::warn!("Failed to parse server event: {} - {}", e, text);
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let detail = frame
                            .map(|f| format!("{} {}", f.code, f.reason))
                            .unwrap_or_else(|| "no close frame".to_string());
                        return Err(RealtimeError::ConnectionFailed(format!(
                            "closed by server ({detail})"
                        )));
                    }
                    Some(Ok(Message::Ping(data))) => {
                        ws_sink
                            .send(Message::Pong(data))
                            .await
                            .map_err(|e| RealtimeError::WebSocketError(e.to_string()))?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(RealtimeError::WebSocketError(e.to_string())),
                    None => {
                        return Err(RealtimeError::ConnectionFailed(
                            "stream ended".to_string(),
                        ));
                    }
                },
            }
        }
    }
}

async fn send_event<S>(sink: &mut S, event: &ClientEvent) -> RealtimeResult<()>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let json = serde_json::to_string(event)?;
    if !matches!(event, ClientEvent::InputAudioBufferAppend { .. }) {
        tracing::debug!(event = event.kind(), "Sending OpenAI Realtime event");
    }
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| RealtimeError::WebSocketError(e.to_string()))
}
