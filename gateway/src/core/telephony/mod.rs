//! Telephony media-stream protocol.
//!
//! # Protocol
//!
//! ## Telephony → Gateway
//!
//! - **connected**: transport handshake
//! - **start**: stream started, carries `streamSid`
//! - **media**: audio frame (`timestamp` in ms, base64 μ-law `payload`)
//! - **mark**: playback acknowledgment for a mark we sent
//! - **stop**: stream ended
//!
//! ## Gateway → Telephony
//!
//! - **media**: reply audio for playback
//! - **mark**: playback progress marker
//! - **clear**: drop buffered playback (barge-in)

mod messages;

/// Peer name used by the link and in logs.
pub const TELEPHONY_PEER: &str = "telephony";

pub use messages::{
    MarkPayload, MediaFrame, OutboundMedia, StartMetadata, TelephonyEvent, TelephonyOutbound,
};
