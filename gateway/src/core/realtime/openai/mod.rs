//! OpenAI Realtime API module.
//!
//! Speech-to-speech sessions over OpenAI's WebSocket Realtime API.
//!
//! # Supported Models
//!
//! - `gpt-realtime` - GPT Realtime
//! - `gpt-realtime-2025-08-28` - August 2025 snapshot
//! - `gpt-realtime-mini` - Mini model for lower latency
//!
//! # Supported Voices
//!
//! alloy, ash, ballad, cedar, coral, echo, marin, sage, shimmer, verse
//!
//! # Audio Format
//!
//! Telephony calls use G.711 μ-law (`audio/pcmu`) at 8kHz in both
//! directions. Input can alternatively be declared as `audio/pcm` at 24kHz
//! when the gateway expands μ-law to 16-bit linear samples and upsamples
//! them before forwarding.

mod client;
mod config;
mod messages;

pub use client::{AI_PEER, OpenAIRealtime};
pub use config::{
    OPENAI_REALTIME_URL, OpenAIRealtimeAudioFormat, OpenAIRealtimeModel, OpenAIRealtimeVoice,
};
pub use messages::{
    ApiError, AudioConfig, AudioInputConfig, AudioOutputConfig, ClientEvent, Response,
    ServerEvent, Session, SessionConfig, TurnDetection,
};
