//! Media-stream WebSocket handler
//!
//! Each accepted socket is one call. The handler opens the AI peer, wires
//! both sockets to a [`CallRelay`] through [`PeerLink`]s, and runs the relay
//! until either side goes away.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::link::{LinkCommand, LinkReceiver, PeerLink};
use crate::core::realtime::OpenAIRealtime;
use crate::core::relay::{CallRelay, RelayError, RelayEvent, event_channel};
use crate::core::telephony::{TELEPHONY_PEER, TelephonyEvent, TelephonyOutbound};
use crate::state::AppState;

/// Outbound telephony frames buffered per call
const CHANNEL_BUFFER_SIZE: usize = 1024;

/// Maximum WebSocket frame size (1 MB)
const MAX_WS_FRAME_SIZE: usize = 1024 * 1024;

/// Maximum WebSocket message size (1 MB)
const MAX_WS_MESSAGE_SIZE: usize = 1024 * 1024;

/// How long the AI task gets to send its close frame after the relay ends
const AI_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Media-stream WebSocket handler
///
/// Upgrades the telephony provider's connection. One relay session runs per
/// socket.
pub async fn media_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!("Media stream WebSocket upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_media_stream(socket, state))
}

/// Run one call over an upgraded telephony socket.
pub async fn handle_media_stream(mut socket: WebSocket, state: Arc<AppState>) {
    let call_id = Uuid::new_v4();
    let relay_config = state.relay_config();
    info!(%call_id, "Media stream connection established");

    let client = match OpenAIRealtime::new(
        &state.config.openai_api_key,
        &state.config.realtime_url,
        relay_config.session_config(),
    ) {
        Ok(client) => client,
        Err(e) => {
            let e = RelayError::from(e);
            error!(%call_id, "{}", e);
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };

    let (events_tx, events_rx) = event_channel();

    // The AI connection is opened concurrently with the telephony stream.
    let (ai_link, mut ai_task) = client.spawn(events_tx.clone());

    let (sink, stream) = socket.split();
    let (telephony_link, commands) = PeerLink::channel(TELEPHONY_PEER, CHANNEL_BUFFER_SIZE);
    commands.mark_open();

    let writer_task = tokio::spawn(write_telephony(sink, commands));
    let reader_task = tokio::spawn(read_telephony(stream, events_tx.clone()));

    let relay = CallRelay::new(
        call_id,
        relay_config,
        telephony_link,
        ai_link,
        (events_tx, events_rx),
    );
    let exit = relay.run().await;

    // Cleanup
    reader_task.abort();
    let _ = writer_task.await;
    if tokio::time::timeout(AI_SHUTDOWN_GRACE, &mut ai_task)
        .await
        .is_err()
    {
        debug!(%call_id, "AI task still running after teardown, aborting");
        ai_task.abort();
    }

    info!(%call_id, ?exit, "Media stream connection terminated");
}

/// Forward relay output to the telephony socket until the link is closed.
async fn write_telephony(
    mut sender: SplitSink<WebSocket, Message>,
    mut commands: LinkReceiver<TelephonyOutbound>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            LinkCommand::Send(frame) => {
                let json = match serde_json::to_string(&frame) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize telephony frame: {}", e);
                        continue;
                    }
                };
                if let Err(e) = sender.send(Message::Text(json.into())).await {
                    warn!("Failed to send telephony frame: {}", e);
                    break;
                }
            }
            LinkCommand::Close => {
                info!("Closing media stream WebSocket connection");
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    }

    commands.mark_closed();
}

/// Parse telephony frames into relay events and report when the socket ends.
async fn read_telephony(mut receiver: SplitStream<WebSocket>, events: mpsc::Sender<RelayEvent>) {
    let reason = loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => match TelephonyEvent::parse(&text) {
                Ok(event) => {
                    if events.send(RelayEvent::Telephony(event)).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!("Discarding malformed telephony frame: {}", e);
                }
            },
            Some(Ok(Message::Binary(data))) => {
                debug!("Ignoring binary telephony frame: {} bytes", data.len());
            }
            Some(Ok(Message::Close(_))) | None => break None,
            Some(Ok(_)) => {}
            Some(Err(e)) => break Some(e.to_string()),
        }
    };

    let _ = events.send(RelayEvent::TelephonyClosed { reason }).await;
}
