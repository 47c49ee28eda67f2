//! Realtime speech-to-speech AI peer.
//!
//! # Architecture
//!
//! A provider client is spawned once per call as a connection task. Callers
//! push [`openai::ClientEvent`]s through a [`crate::core::link::PeerLink`]
//! and receive [`RealtimeSignal`]s on an mpsc channel of their choosing.

mod base;
pub mod openai;

pub use base::{RealtimeError, RealtimeResult, RealtimeSignal};
pub use openai::{
    ClientEvent, OPENAI_REALTIME_URL, OpenAIRealtime, OpenAIRealtimeAudioFormat,
    OpenAIRealtimeModel, OpenAIRealtimeVoice, ServerEvent, SessionConfig,
};
