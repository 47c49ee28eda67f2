//! OpenAI Realtime API WebSocket message types.
//!
//! This module defines the client and server event types for the OpenAI Realtime API.
//! All events are JSON-encoded and sent over WebSocket.
//!
//! # Protocol Overview
//!
//! Client events (sent to server):
//! - session.update - Update session configuration
//! - input_audio_buffer.append - Append audio to buffer
//! - input_audio_buffer.commit - Commit audio buffer
//! - conversation.item.truncate - Cut an assistant item at the played position
//! - response.create - Generate a response
//!
//! Server events (received from server):
//! - session.created - Session created
//! - session.updated - Session configuration updated
//! - input_audio_buffer.speech_started - Speech detection started
//! - input_audio_buffer.speech_stopped - Speech detection stopped
//! - input_audio_buffer.committed - Audio buffer committed
//! - conversation.item.truncated - Item truncated
//! - response.created - Response generation started
//! - response.output_audio.delta - Audio data chunk
//! - response.output_audio.done - Audio generation complete
//! - response.done - Response complete
//! - error - Error occurred
//!
//! Everything else the server sends (transcripts, rate limits, ...) parses as
//! [`ServerEvent::Unknown`].

use serde::{Deserialize, Serialize};

use super::config::{OpenAIRealtimeAudioFormat, OpenAIRealtimeModel, OpenAIRealtimeVoice};

// =============================================================================
// Session Configuration
// =============================================================================

/// Session configuration for OpenAI Realtime API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionConfig {
    /// Always `realtime` for speech-to-speech sessions
    #[serde(rename = "type")]
    pub session_type: &'static str,

    /// Model serving the session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<OpenAIRealtimeModel>,

    /// Response modalities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_modalities: Option<Vec<String>>,

    /// System instructions for the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Input and output audio settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_type: "realtime",
            model: None,
            output_modalities: None,
            instructions: None,
            audio: None,
        }
    }
}

/// Audio section of the session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<AudioInputConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<AudioOutputConfig>,
}

/// Input audio settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioInputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OpenAIRealtimeAudioFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_detection: Option<TurnDetection>,
}

/// Output audio settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioOutputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OpenAIRealtimeAudioFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<OpenAIRealtimeVoice>,
}

/// Turn detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    /// Server-side VAD
    #[serde(rename = "server_vad")]
    ServerVad {
        /// Activation threshold
        #[serde(skip_serializing_if = "Option::is_none")]
        threshold: Option<f32>,
        /// Audio prefix padding in ms
        #[serde(skip_serializing_if = "Option::is_none")]
        prefix_padding_ms: Option<u32>,
        /// Silence duration in ms
        #[serde(skip_serializing_if = "Option::is_none")]
        silence_duration_ms: Option<u32>,
        /// Whether to create response on turn end
        #[serde(skip_serializing_if = "Option::is_none")]
        create_response: Option<bool>,
        /// Whether to interrupt on speech
        #[serde(skip_serializing_if = "Option::is_none")]
        interrupt_response: Option<bool>,
    },
}

// =============================================================================
// Client Events (sent to server)
// =============================================================================

/// Client events sent to the OpenAI Realtime API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Update session configuration
    #[serde(rename = "session.update")]
    SessionUpdate {
        /// Session configuration
        session: SessionConfig,
    },

    /// Append audio to input buffer
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend {
        /// Base64-encoded audio data
        audio: String,
    },

    /// Commit the input audio buffer
    #[serde(rename = "input_audio_buffer.commit")]
    InputAudioBufferCommit,

    /// Truncate a conversation item
    #[serde(rename = "conversation.item.truncate")]
    ConversationItemTruncate {
        /// Item ID
        item_id: String,
        /// Content index
        content_index: u32,
        /// Audio end in ms
        audio_end_ms: u64,
    },

    /// Create a response
    #[serde(rename = "response.create")]
    ResponseCreate,
}

impl ClientEvent {
    /// Event type string for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionUpdate { .. } => "session.update",
            Self::InputAudioBufferAppend { .. } => "input_audio_buffer.append",
            Self::InputAudioBufferCommit => "input_audio_buffer.commit",
            Self::ConversationItemTruncate { .. } => "conversation.item.truncate",
            Self::ResponseCreate => "response.create",
        }
    }
}

// =============================================================================
// Server Events (received from server)
// =============================================================================

/// Server events received from the OpenAI Realtime API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Error occurred
    #[serde(rename = "error")]
    Error {
        /// Error details
        error: ApiError,
    },

    /// Session created
    #[serde(rename = "session.created")]
    SessionCreated {
        /// Session information
        #[serde(default)]
        session: Session,
    },

    /// Session updated
    #[serde(rename = "session.updated")]
    SessionUpdated {
        /// Session information
        #[serde(default)]
        session: Session,
    },

    /// Speech started (VAD detected speech)
    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted {
        /// Audio start timestamp in ms
        #[serde(default)]
        audio_start_ms: u64,
        /// Item ID
        #[serde(default)]
        item_id: String,
    },

    /// Speech stopped (VAD detected silence)
    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped {
        /// Audio end timestamp in ms
        #[serde(default)]
        audio_end_ms: u64,
        /// Item ID
        #[serde(default)]
        item_id: String,
    },

    /// Audio buffer committed
    #[serde(rename = "input_audio_buffer.committed")]
    InputAudioBufferCommitted {
        /// New item ID
        #[serde(default)]
        item_id: String,
    },

    /// Conversation item truncated
    #[serde(rename = "conversation.item.truncated")]
    ConversationItemTruncated {
        /// Item ID
        #[serde(default)]
        item_id: String,
        /// Audio end in ms
        #[serde(default)]
        audio_end_ms: u64,
    },

    /// Response created
    #[serde(rename = "response.created")]
    ResponseCreated {
        /// Response information
        #[serde(default)]
        response: Response,
    },

    /// Audio delta (audio data chunk)
    #[serde(
        rename = "response.output_audio.delta",
        alias = "response.audio.delta"
    )]
    OutputAudioDelta {
        /// Response ID
        #[serde(default)]
        response_id: String,
        /// Item ID
        item_id: String,
        /// Content index
        #[serde(default)]
        content_index: u32,
        /// Base64-encoded audio delta
        delta: String,
    },

    /// Audio done
    #[serde(rename = "response.output_audio.done", alias = "response.audio.done")]
    OutputAudioDone {
        /// Item ID
        #[serde(default)]
        item_id: String,
    },

    /// Response done
    #[serde(rename = "response.done")]
    ResponseDone {
        /// Response information
        #[serde(default)]
        response: Response,
    },

    /// Any event the relay does not act on
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// Event type string for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Error { .. } => "error",
            Self::SessionCreated { .. } => "session.created",
            Self::SessionUpdated { .. } => "session.updated",
            Self::SpeechStarted { .. } => "input_audio_buffer.speech_started",
            Self::SpeechStopped { .. } => "input_audio_buffer.speech_stopped",
            Self::InputAudioBufferCommitted { .. } => "input_audio_buffer.committed",
            Self::ConversationItemTruncated { .. } => "conversation.item.truncated",
            Self::ResponseCreated { .. } => "response.created",
            Self::OutputAudioDelta { .. } => "response.output_audio.delta",
            Self::OutputAudioDone { .. } => "response.output_audio.done",
            Self::ResponseDone { .. } => "response.done",
            Self::Unknown => "unknown",
        }
    }
}

// =============================================================================
// Supporting Types
// =============================================================================

/// API error information.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiError {
    /// Error type
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// Error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error message
    #[serde(default)]
    pub message: String,
    /// Parameter that caused the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    /// Event ID that caused the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

/// Session information.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Session {
    /// Session ID
    #[serde(default)]
    pub id: Option<String>,
    /// Model used
    #[serde(default)]
    pub model: Option<String>,
}

/// Response information.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Response {
    /// Response ID
    #[serde(default)]
    pub id: String,
    /// Final status (completed, cancelled, failed, incomplete)
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_and_response_create_serialization() {
        let json = serde_json::to_value(ClientEvent::InputAudioBufferCommit).unwrap();
        assert_eq!(json, serde_json::json!({"type": "input_audio_buffer.commit"}));

        let json = serde_json::to_value(ClientEvent::ResponseCreate).unwrap();
        assert_eq!(json, serde_json::json!({"type": "response.create"}));
    }

    #[test]
    fn test_append_serialization() {
        let event = ClientEvent::InputAudioBufferAppend {
            audio: "/w==".to_string(),
        };
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            serde_json::json!({"type": "input_audio_buffer.append", "audio": "/w=="})
        );
    }

    #[test]
    fn test_truncate_serialization() {
        let event = ClientEvent::ConversationItemTruncate {
            item_id: "item_1".to_string(),
            content_index: 0,
            audio_end_ms: 1500,
        };
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            serde_json::json!({
                "type": "conversation.item.truncate",
                "item_id": "item_1",
                "content_index": 0,
                "audio_end_ms": 1500
            })
        );
    }

    #[test]
    fn test_session_update_serialization() {
        let event = ClientEvent::SessionUpdate {
            session: SessionConfig {
                model: Some(OpenAIRealtimeModel::GptRealtime),
                output_modalities: Some(vec!["audio".to_string()]),
                instructions: Some("Be brief.".to_string()),
                audio: Some(AudioConfig {
                    input: Some(AudioInputConfig {
                        format: Some(OpenAIRealtimeAudioFormat::Pcmu),
                        turn_detection: Some(TurnDetection::ServerVad {
                            threshold: Some(0.5),
                            prefix_padding_ms: Some(300),
                            silence_duration_ms: Some(500),
                            create_response: Some(false),
                            interrupt_response: Some(true),
                        }),
                    }),
                    output: Some(AudioOutputConfig {
                        format: Some(OpenAIRealtimeAudioFormat::Pcmu),
                        voice: Some(OpenAIRealtimeVoice::Alloy),
                    }),
                }),
                ..Default::default()
            },
        };

        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["type"], "session.update");
        assert_eq!(json["session"]["type"], "realtime");
        assert_eq!(json["session"]["model"], "gpt-realtime");
        assert_eq!(json["session"]["output_modalities"][0], "audio");
        assert_eq!(json["session"]["audio"]["input"]["format"]["type"], "audio/pcmu");
        assert_eq!(
            json["session"]["audio"]["input"]["turn_detection"],
            serde_json::json!({
                "type": "server_vad",
                "threshold": 0.5,
                "prefix_padding_ms": 300,
                "silence_duration_ms": 500,
                "create_response": false,
                "interrupt_response": true
            })
        );
        assert_eq!(json["session"]["audio"]["output"]["voice"], "alloy");
    }

    #[test]
    fn test_error_event_deserialization() {
        let json = r#"{
            "type": "error",
            "event_id": "evt_1",
            "error": {
                "type": "invalid_request_error",
                "message": "Test error"
            }
        }"#;
        let event: ServerEvent = serde_json::from_str(json).unwrap();
        match event {
            ServerEvent::Error { error } => {
                assert_eq!(error.error_type, "invalid_request_error");
                assert_eq!(error.message, "Test error");
            }
            other => panic!("Wrong event type: {other:?}"),
        }
    }

    #[test]
    fn test_audio_delta_accepts_both_names() {
        for name in ["response.output_audio.delta", "response.audio.delta"] {
            let json = format!(r#"{{"type": "{name}", "item_id": "item_9", "delta": "AAA="}}"#);
            let event: ServerEvent = serde_json::from_str(&json).unwrap();
            match event {
                ServerEvent::OutputAudioDelta { item_id, delta, .. } => {
                    assert_eq!(item_id, "item_9");
                    assert_eq!(delta, "AAA=");
                }
                other => panic!("Wrong event type: {other:?}"),
            }
        }
    }

    #[test]
    fn test_speech_started_minimal() {
        let json = r#"{"type": "input_audio_buffer.speech_started"}"#;
        let event: ServerEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, ServerEvent::SpeechStarted { .. }));
    }

    #[test]
    fn test_response_done_with_status() {
        let json = r#"{"type": "response.done", "response": {"id": "resp_1", "status": "completed"}}"#;
        let event: ServerEvent = serde_json::from_str(json).unwrap();
        match event {
            ServerEvent::ResponseDone { response } => {
                assert_eq!(response.id, "resp_1");
                assert_eq!(response.status.as_deref(), Some("completed"));
            }
            other => panic!("Wrong event type: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_is_tolerated() {
        let json = r#"{"type": "rate_limits.updated", "rate_limits": []}"#;
        let event: ServerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, ServerEvent::Unknown);
        assert_eq!(event.kind(), "unknown");
    }

    #[test]
    fn test_delta_without_payload_is_an_error() {
        let json = r#"{"type": "response.output_audio.delta", "item_id": "item_1"}"#;
        assert!(serde_json::from_str::<ServerEvent>(json).is_err());
    }
}
