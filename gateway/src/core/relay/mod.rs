//! Per-call relay and turn-taking engine.
//!
//! One [`CallRelay`] runs per media-stream connection. It forwards caller
//! audio to the AI peer, decides when the caller's turn is over, relays the
//! reply audio back with playback markers, and cuts the reply short when the
//! caller barges in.
//!
//! # Turn phases
//!
//! ```text
//! Idle --first frame--> Capturing --silence | speech_stopped | stop--> Requested
//!   ^                                                                      |
//!   |                                                              reply fragment
//!   |                                                                      v
//!   +------------- reply done and all marks played | barge-in ------- Playing
//! ```

mod config;
mod interruption;
mod playback;
mod runtime;
mod session;
mod turn;

use thiserror::Error;

use crate::core::link::LinkError;
use crate::core::realtime::RealtimeError;

pub use config::{DEFAULT_INSTRUCTIONS, RelayConfig, TurnDetectionMode};
pub use runtime::{CallRelay, RELAY_EVENT_CAPACITY, RelayEvent, RelayExit, event_channel};
pub use session::{CallSession, Effect, PlaybackState, TurnPhase, TurnWindow};
pub use turn::TurnTrigger;

/// Errors surfaced by the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A peer could not take the message
    #[error(transparent)]
    Link(#[from] LinkError),

    /// The AI peer could not be set up
    #[error("AI peer setup failed: {0}")]
    AiSetup(#[from] RealtimeError),
}
