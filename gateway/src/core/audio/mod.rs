//! Audio format adaptation between the telephony and AI peers.
//!
//! Telephony frames arrive as base64 μ-law at 8kHz. Depending on the
//! negotiated AI-side input format they are either forwarded untouched or
//! expanded to 24kHz PCM 16-bit little-endian before being re-encoded for
//! the AI peer. The AI peer only accepts linear input at 24kHz.

pub mod mulaw;

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sample rate of telephony G.711 audio.
pub const TELEPHONY_SAMPLE_RATE: u32 = 8000;

/// Sample rate of linear PCM sent to the AI peer.
pub const LINEAR_PCM_SAMPLE_RATE: u32 = 24000;

/// Errors raised while adapting an inbound frame.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Payload was not valid base64
    #[error("Invalid base64 audio payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
}

/// How inbound telephony audio is presented to the AI peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCodecMode {
    /// Forward μ-law unchanged; the AI peer is told to expect G.711 μ-law.
    #[default]
    Passthrough,
    /// Expand μ-law to 24kHz PCM 16-bit little-endian before forwarding.
    LinearPcm,
}

impl AudioCodecMode {
    /// Convert to the configuration value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::LinearPcm => "linear_pcm",
        }
    }

    /// Parse from a configuration string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "passthrough" | "mulaw" | "ulaw" | "g711_ulaw" => Some(Self::Passthrough),
            "linear_pcm" | "linear" | "pcm" | "pcm16" => Some(Self::LinearPcm),
            _ => None,
        }
    }

    /// Adapt a base64 telephony payload for the AI peer's input buffer.
    ///
    /// Passthrough returns the payload as-is without decoding it.
    pub fn adapt_inbound(&self, payload: &str) -> Result<String, AudioError> {
        match self {
            Self::Passthrough => Ok(payload.to_string()),
            Self::LinearPcm => {
                let frame = BASE64_STANDARD.decode(payload)?;
                let repeat = (LINEAR_PCM_SAMPLE_RATE / TELEPHONY_SAMPLE_RATE) as usize;
                Ok(BASE64_STANDARD.encode(mulaw::decode_to_pcm16le(&frame, repeat)))
            }
        }
    }
}

impl std::fmt::Display for AudioCodecMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
