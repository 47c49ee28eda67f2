//! OpenAI Realtime API configuration types.
//!
//! Model and voice names as accepted in configuration files, and the audio
//! formats a telephony call can declare for the session's input and output.

use serde::{Deserialize, Serialize};

/// OpenAI Realtime API WebSocket endpoint.
pub const OPENAI_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime";

// =============================================================================
// Models
// =============================================================================

/// Supported OpenAI Realtime models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpenAIRealtimeModel {
    /// GPT Realtime (default)
    #[default]
    #[serde(rename = "gpt-realtime")]
    GptRealtime,
    /// GPT Realtime 2025-08-28 snapshot
    #[serde(rename = "gpt-realtime-2025-08-28")]
    GptRealtime20250828,
    /// GPT Realtime Mini
    #[serde(rename = "gpt-realtime-mini")]
    GptRealtimeMini,
    /// GPT Realtime Mini 2025-10-06 snapshot
    #[serde(rename = "gpt-realtime-mini-2025-10-06")]
    GptRealtimeMini20251006,
}

impl OpenAIRealtimeModel {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GptRealtime => "gpt-realtime",
            Self::GptRealtime20250828 => "gpt-realtime-2025-08-28",
            Self::GptRealtimeMini => "gpt-realtime-mini",
            Self::GptRealtimeMini20251006 => "gpt-realtime-mini-2025-10-06",
        }
    }

    /// Parse from a configuration string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gpt-realtime" => Some(Self::GptRealtime),
            "gpt-realtime-2025-08-28" => Some(Self::GptRealtime20250828),
            "gpt-realtime-mini" => Some(Self::GptRealtimeMini),
            "gpt-realtime-mini-2025-10-06" => Some(Self::GptRealtimeMini20251006),
            _ => None,
        }
    }
}

impl std::fmt::Display for OpenAIRealtimeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Voices
// =============================================================================

/// Available voices for OpenAI Realtime API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenAIRealtimeVoice {
    /// Alloy voice (default)
    #[default]
    Alloy,
    Ash,
    Ballad,
    Cedar,
    Coral,
    Echo,
    Marin,
    Sage,
    Shimmer,
    Verse,
}

impl OpenAIRealtimeVoice {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Ash => "ash",
            Self::Ballad => "ballad",
            Self::Cedar => "cedar",
            Self::Coral => "coral",
            Self::Echo => "echo",
            Self::Marin => "marin",
            Self::Sage => "sage",
            Self::Shimmer => "shimmer",
            Self::Verse => "verse",
        }
    }

    /// Parse from a configuration string.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|voice| voice.as_str() == s.trim().to_lowercase())
    }

    /// Get all available voices.
    pub fn all() -> &'static [OpenAIRealtimeVoice] {
        &[
            Self::Alloy,
            Self::Ash,
            Self::Ballad,
            Self::Cedar,
            Self::Coral,
            Self::Echo,
            Self::Marin,
            Self::Sage,
            Self::Shimmer,
            Self::Verse,
        ]
    }
}

impl std::fmt::Display for OpenAIRealtimeVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Audio Formats
// =============================================================================

/// Audio formats accepted by the Realtime API session.
///
/// Serialized as the `{"type": "audio/..."}` objects used under
/// `session.audio.input.format` and `session.audio.output.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OpenAIRealtimeAudioFormat {
    /// G.711 μ-law at 8kHz
    #[serde(rename = "audio/pcmu")]
    Pcmu,
    /// PCM 16-bit signed little-endian
    #[serde(rename = "audio/pcm")]
    Pcm { rate: u32 },
}

// =============================================================================
// Tests
// =============================================================================
