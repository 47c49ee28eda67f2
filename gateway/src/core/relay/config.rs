//! Per-call relay configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::audio::{AudioCodecMode, LINEAR_PCM_SAMPLE_RATE};
use crate::core::realtime::openai::{
    AudioConfig, AudioInputConfig, AudioOutputConfig, OpenAIRealtimeAudioFormat,
    OpenAIRealtimeModel, OpenAIRealtimeVoice, SessionConfig, TurnDetection,
};

/// Default system instructions for the assistant.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful and bubbly AI assistant who loves to \
chat about anything the user is interested in and is prepared to offer them facts. Keep your \
answers short and conversational, since the caller is listening on a phone line.";

/// Which signals close a caller turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDetectionMode {
    /// Local silence timer only
    #[default]
    LocalSilence,
    /// The AI peer's `speech_stopped` signal only
    PeerVad,
    /// Both; the first trigger wins, the other is absorbed by the in-flight guard
    Hybrid,
}

impl TurnDetectionMode {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalSilence => "local_silence",
            Self::PeerVad => "peer_vad",
            Self::Hybrid => "hybrid",
        }
    }

    /// Parse from a configuration string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local_silence" | "local" | "silence" => Some(Self::LocalSilence),
            "peer_vad" | "vad" | "server_vad" => Some(Self::PeerVad),
            "hybrid" | "both" => Some(Self::Hybrid),
            _ => None,
        }
    }

    /// Whether inbound frames drive the local silence timer.
    #[inline]
    pub fn uses_silence_timer(&self) -> bool {
        matches!(self, Self::LocalSilence | Self::Hybrid)
    }

    /// Whether the AI peer's `speech_stopped` signal closes a turn.
    #[inline]
    pub fn uses_peer_vad(&self) -> bool {
        matches!(self, Self::PeerVad | Self::Hybrid)
    }
}

impl std::fmt::Display for TurnDetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration injected into every call session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub model: OpenAIRealtimeModel,
    pub voice: OpenAIRealtimeVoice,
    pub instructions: String,
    pub codec: AudioCodecMode,
    pub turn_detection: TurnDetectionMode,
    /// Quiet interval after the last inbound frame that ends a turn
    pub silence_timeout_ms: u64,
    /// Turns shorter than this are treated as noise
    pub min_turn_ms: u64,
    /// Wait between deciding to commit and sending the commit
    pub flush_delay_ms: u64,
    pub vad_threshold: f32,
    pub vad_prefix_padding_ms: u32,
    pub vad_silence_duration_ms: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            model: OpenAIRealtimeModel::default(),
            voice: OpenAIRealtimeVoice::default(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            codec: AudioCodecMode::default(),
            turn_detection: TurnDetectionMode::default(),
            silence_timeout_ms: 500,
            min_turn_ms: 250,
            flush_delay_ms: 100,
            vad_threshold: 0.5,
            vad_prefix_padding_ms: 300,
            vad_silence_duration_ms: 500,
        }
    }
}

impl RelayConfig {
    #[inline]
    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    #[inline]
    pub fn flush_delay(&self) -> Duration {
        Duration::from_millis(self.flush_delay_ms)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.silence_timeout_ms == 0 {
            return Err("silence_timeout_ms must be greater than zero".to_string());
        }
        if !(0.0..=1.0).contains(&self.vad_threshold) {
            return Err(format!(
                "vad_threshold must be between 0.0 and 1.0, got {}",
                self.vad_threshold
            ));
        }
        Ok(())
    }

    /// AI-side input format matching the codec mode.
    pub fn input_format(&self) -> OpenAIRealtimeAudioFormat {
        match self.codec {
            AudioCodecMode::Passthrough => OpenAIRealtimeAudioFormat::Pcmu,
            AudioCodecMode::LinearPcm => OpenAIRealtimeAudioFormat::Pcm {
                rate: LINEAR_PCM_SAMPLE_RATE,
            },
        }
    }

    /// The one-time `session.update` payload sent when the AI peer connects.
    ///
    /// Reply audio is always requested as μ-law so it can be forwarded to
    /// the telephony peer untouched. Server VAD runs in every mode because
    /// its `speech_started` signal drives barge-in, but the AI peer never
    /// starts a response on its own; the relay decides when a turn is over.
    pub fn session_config(&self) -> SessionConfig {
        let turn_detection = Some(TurnDetection::ServerVad {
            threshold: Some(self.vad_threshold),
            prefix_padding_ms: Some(self.vad_prefix_padding_ms),
            silence_duration_ms: Some(self.vad_silence_duration_ms),
            create_response: Some(false),
            interrupt_response: Some(true),
        });

        SessionConfig {
            model: Some(self.model),
            output_modalities: Some(vec!["audio".to_string()]),
            instructions: Some(self.instructions.clone()),
            audio: Some(AudioConfig {
                input: Some(AudioInputConfig {
                    format: Some(self.input_format()),
                    turn_detection,
                }),
                output: Some(AudioOutputConfig {
                    format: Some(OpenAIRealtimeAudioFormat::Pcmu),
                    voice: Some(self.voice),
                }),
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.model, OpenAIRealtimeModel::GptRealtime);
        assert_eq!(config.voice, OpenAIRealtimeVoice::Alloy);
        assert_eq!(config.codec, AudioCodecMode::Passthrough);
        assert_eq!(config.turn_detection, TurnDetectionMode::LocalSilence);
        assert_eq!(config.silence_timeout(), Duration::from_millis(500));
        assert_eq!(config.min_turn_ms, 250);
        assert_eq!(config.flush_delay(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = RelayConfig {
            silence_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("silence_timeout_ms"));

        let config = RelayConfig {
            vad_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("vad_threshold"));
    }

    #[test]
    fn test_mode_parse_and_capabilities() {
        assert_eq!(
            TurnDetectionMode::parse("PEER_VAD"),
            Some(TurnDetectionMode::PeerVad)
        );
        assert_eq!(TurnDetectionMode::parse("hybrid"), Some(TurnDetectionMode::Hybrid));
        assert_eq!(TurnDetectionMode::parse("semantic"), None);

        assert!(TurnDetectionMode::LocalSilence.uses_silence_timer());
        assert!(!TurnDetectionMode::LocalSilence.uses_peer_vad());
        assert!(!TurnDetectionMode::PeerVad.uses_silence_timer());
        assert!(TurnDetectionMode::Hybrid.uses_silence_timer());
        assert!(TurnDetectionMode::Hybrid.uses_peer_vad());
    }

    #[test]
    fn test_session_config_local_silence() {
        let json = serde_json::to_value(RelayConfig::default().session_config()).unwrap();
        assert_eq!(json["type"], "realtime");
        assert_eq!(json["model"], "gpt-realtime");
        assert_eq!(json["output_modalities"], serde_json::json!(["audio"]));
        assert_eq!(json["audio"]["input"]["format"]["type"], "audio/pcmu");
        let vad = &json["audio"]["input"]["turn_detection"];
        assert_eq!(vad["type"], "server_vad");
        assert_eq!(vad["create_response"], false);
        assert_eq!(vad["interrupt_response"], true);
        assert_eq!(vad["threshold"], 0.5);
        assert_eq!(json["audio"]["output"]["format"]["type"], "audio/pcmu");
        assert_eq!(json["audio"]["output"]["voice"], "alloy");
        assert!(
            json["instructions"]
                .as_str()
                .unwrap()
                .starts_with("You are a helpful")
        );
    }

    #[test]
    fn test_server_vad_enabled_in_every_mode() {
        for mode in [
            TurnDetectionMode::LocalSilence,
            TurnDetectionMode::PeerVad,
            TurnDetectionMode::Hybrid,
        ] {
            let config = RelayConfig {
                turn_detection: mode,
                ..Default::default()
            };
            match config.session_config().audio.and_then(|audio| audio.input) {
                Some(AudioInputConfig {
                    turn_detection:
                        Some(TurnDetection::ServerVad {
                            create_response,
                            interrupt_response,
                            ..
                        }),
                    ..
                }) => {
                    assert_eq!(create_response, Some(false), "{mode}");
                    assert_eq!(interrupt_response, Some(true), "{mode}");
                }
                other => panic!("Expected server VAD for {mode}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_session_config_peer_vad_linear() {
        let config = RelayConfig {
            codec: AudioCodecMode::LinearPcm,
            turn_detection: TurnDetectionMode::PeerVad,
            voice: OpenAIRealtimeVoice::Marin,
            ..Default::default()
        };
        let json = serde_json::to_value(config.session_config()).unwrap();
        assert_eq!(
            json["audio"]["input"]["format"],
            serde_json::json!({"type": "audio/pcm", "rate": 24000})
        );
        let vad = &json["audio"]["input"]["turn_detection"];
        assert_eq!(vad["type"], "server_vad");
        assert_eq!(vad["create_response"], false);
        assert_eq!(vad["interrupt_response"], true);
        assert_eq!(vad["silence_duration_ms"], 500);
        assert_eq!(json["audio"]["output"]["voice"], "marin");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: RelayConfig =
            serde_yaml::from_str("voice: echo\nturn_detection: hybrid\nmin_turn_ms: 100\n")
                .unwrap();
        assert_eq!(config.voice, OpenAIRealtimeVoice::Echo);
        assert_eq!(config.turn_detection, TurnDetectionMode::Hybrid);
        assert_eq!(config.min_turn_ms, 100);
        assert_eq!(config.silence_timeout_ms, 500);
    }
}
