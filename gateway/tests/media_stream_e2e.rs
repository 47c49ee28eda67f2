//! Media Stream End-to-End Tests
//!
//! Runs the real server on a loopback port with a mock realtime AI peer
//! built on `accept_async`, and drives a call from a WebSocket client the
//! way the telephony provider would.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, connect_async, tungstenite::Message};

use voicebridge_gateway::{ServerConfig, core::relay::RelayConfig, routes, state::AppState};

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Mock realtime peer: forwards every client event to `received` and sends
/// whatever the test pushes into the returned sender.
async fn spawn_mock_ai() -> (u16, mpsc::UnboundedReceiver<Value>, mpsc::UnboundedSender<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (received_tx, received_rx) = mpsc::unbounded_channel();
    let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel::<Value>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws_stream = accept_async(stream).await.unwrap();
        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        let value: Value = serde_json::from_str(&text).unwrap();
                        let _ = received_tx.send(value);
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {
                        let _ = received_tx.send(json!({"type": "mock.closed"}));
                        break;
                    }
                    Some(Ok(_)) => {}
                },
                event = outgoing_rx.recv() => match event {
                    Some(event) => {
                        write.send(Message::Text(event.to_string().into())).await.unwrap();
                    }
                    None => break,
                },
            }
        }
    });

    (port, received_rx, outgoing_tx)
}

async fn spawn_gateway(realtime_url: String) -> u16 {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_host: None,
        openai_api_key: "sk-test".to_string(),
        realtime_url,
        relay: RelayConfig {
            silence_timeout_ms: 100,
            min_turn_ms: 50,
            flush_delay_ms: 10,
            ..Default::default()
        },
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let app = routes::create_router(AppState::new(config));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

async fn next_ai_event(received: &mut mpsc::UnboundedReceiver<Value>) -> Value {
    timeout(STEP_TIMEOUT, received.recv())
        .await
        .expect("mock AI peer timed out")
        .expect("mock AI peer stopped")
}

#[tokio::test]
async fn test_call_round_trip() {
    let (ai_port, mut received, ai_out) = spawn_mock_ai().await;
    let gateway_port =
        spawn_gateway(format!("ws://127.0.0.1:{ai_port}/v1/realtime")).await;

    let (mut telephony, _) = connect_async(format!("ws://127.0.0.1:{gateway_port}/media-stream"))
        .await
        .unwrap();

    // The session is configured before anything else reaches the AI peer.
    let update = next_ai_event(&mut received).await;
    assert_eq!(update["type"], "session.update");
    assert_eq!(update["session"]["type"], "realtime");
    assert_eq!(update["session"]["audio"]["output"]["format"]["type"], "audio/pcmu");
    let vad = &update["session"]["audio"]["input"]["turn_detection"];
    assert_eq!(vad["type"], "server_vad");
    assert_eq!(vad["create_response"], false);
    assert_eq!(vad["interrupt_response"], true);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let frames = [
        json!({"event": "connected", "protocol": "Call", "version": "1.0.0"}),
        json!({"event": "start", "start": {"streamSid": "MZe2e", "callSid": "CAe2e"}}),
    ];
    for frame in frames {
        telephony
            .send(Message::Text(frame.to_string().into()))
            .await
            .unwrap();
    }
    for timestamp in [0, 20, 40, 60, 80] {
        let frame = json!({
            "event": "media",
            "media": {"timestamp": timestamp.to_string(), "payload": "/////w=="}
        });
        telephony
            .send(Message::Text(frame.to_string().into()))
            .await
            .unwrap();
    }

    for _ in 0..5 {
        let append = next_ai_event(&mut received).await;
        assert_eq!(append["type"], "input_audio_buffer.append");
        assert_eq!(append["audio"], "/////w==");
    }
    assert_eq!(next_ai_event(&mut received).await["type"], "input_audio_buffer.commit");
    assert_eq!(next_ai_event(&mut received).await["type"], "response.create");

    ai_out
        .send(json!({
            "type": "response.output_audio.delta",
            "response_id": "resp_1",
            "item_id": "item_1",
            "output_index": 0,
            "content_index": 0,
            "delta": "AAEC"
        }))
        .unwrap();

    let mut outbound = Vec::new();
    while outbound.len() < 2 {
        let msg = timeout(STEP_TIMEOUT, telephony.next())
            .await
            .expect("gateway timed out")
            .expect("gateway closed")
            .unwrap();
        if let Message::Text(text) = msg {
            outbound.push(serde_json::from_str::<Value>(&text).unwrap());
        }
    }
    assert_eq!(
        outbound[0],
        json!({"event": "media", "streamSid": "MZe2e", "media": {"payload": "AAEC"}})
    );
    assert_eq!(
        outbound[1],
        json!({"event": "mark", "streamSid": "MZe2e", "mark": {"name": "reply-1"}})
    );

    // Hanging up tears down the AI connection as well.
    telephony.close(None).await.unwrap();
    loop {
        let event = next_ai_event(&mut received).await;
        if event["type"] == "mock.closed" {
            break;
        }
    }
}

#[tokio::test]
async fn test_unreachable_ai_ends_call() {
    let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ai_port = unused.local_addr().unwrap().port();
    drop(unused);

    let gateway_port =
        spawn_gateway(format!("ws://127.0.0.1:{ai_port}/v1/realtime")).await;
    let (mut telephony, _) = connect_async(format!("ws://127.0.0.1:{gateway_port}/media-stream"))
        .await
        .unwrap();

    // The gateway closes the telephony socket once the AI peer fails.
    let ended = timeout(Duration::from_secs(15), async {
        loop {
            match telephony.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(ended.is_ok());
}
