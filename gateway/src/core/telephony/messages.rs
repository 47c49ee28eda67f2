//! Telephony media-stream message types.
//!
//! The telephony peer speaks JSON text frames tagged by an `event` field.
//! Inbound audio is base64 μ-law with a per-frame media timestamp in
//! milliseconds; outbound frames address the stream by its `streamSid`.

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Inbound (telephony -> gateway)
// =============================================================================

/// Events received from the telephony peer.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TelephonyEvent {
    /// Transport handshake; carries no session data
    Connected {
        #[serde(default)]
        protocol: Option<String>,
        #[serde(default)]
        version: Option<String>,
    },

    /// Stream started
    Start {
        #[serde(default, rename = "streamSid")]
        stream_sid: Option<String>,
        #[serde(default)]
        start: Option<StartMetadata>,
    },

    /// Inbound audio frame
    Media { media: MediaFrame },

    /// Playback acknowledgment for a previously sent mark
    Mark {
        #[serde(default)]
        mark: Option<MarkPayload>,
    },

    /// Stream stopped
    Stop {
        #[serde(default, rename = "streamSid")]
        stream_sid: Option<String>,
    },

    /// Any event this gateway does not act on (dtmf, ...)
    #[serde(other)]
    Unknown,
}

impl TelephonyEvent {
    /// Parse a text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Short event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Start { .. } => "start",
            Self::Media { .. } => "media",
            Self::Mark { .. } => "mark",
            Self::Stop { .. } => "stop",
            Self::Unknown => "unknown",
        }
    }
}

/// Metadata carried by the `start` event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartMetadata {
    #[serde(default, rename = "streamSid")]
    pub stream_sid: Option<String>,
    #[serde(default, rename = "callSid")]
    pub call_sid: Option<String>,
}

/// A single inbound audio frame.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaFrame {
    /// Media clock in milliseconds since stream start
    #[serde(deserialize_with = "deserialize_millis")]
    pub timestamp: u64,
    /// Base64 μ-law audio
    pub payload: String,
}

/// Mark body shared by inbound acks and outbound marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkPayload {
    pub name: String,
}

/// Accept media timestamps encoded either as JSON numbers or as strings.
fn deserialize_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Number(u64),
        Text(String),
    }

    match Millis::deserialize(deserializer)? {
        Millis::Number(ms) => Ok(ms),
        Millis::Text(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid media timestamp {text:?}: {e}"))),
    }
}

// =============================================================================
// Outbound (gateway -> telephony)
// =============================================================================

/// Frames sent to the telephony peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TelephonyOutbound {
    /// Reply audio for playback
    Media {
        #[serde(rename = "streamSid")]
        stream_sid: String,
        media: OutboundMedia,
    },
    /// Playback progress marker
    Mark {
        #[serde(rename = "streamSid")]
        stream_sid: String,
        mark: MarkPayload,
    },
    /// Drop any audio buffered for playback
    Clear {
        #[serde(rename = "streamSid")]
        stream_sid: String,
    },
}

/// Outbound media body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMedia {
    /// Base64 audio in the telephony peer's native format
    pub payload: String,
}

impl TelephonyOutbound {
    pub fn media(stream_sid: &str, payload: String) -> Self {
        Self::Media {
            stream_sid: stream_sid.to_string(),
            media: OutboundMedia { payload },
        }
    }

    pub fn mark(stream_sid: &str, name: String) -> Self {
        Self::Mark {
            stream_sid: stream_sid.to_string(),
            mark: MarkPayload { name },
        }
    }

    pub fn clear(stream_sid: &str) -> Self {
        Self::Clear {
            stream_sid: stream_sid.to_string(),
        }
    }
}
