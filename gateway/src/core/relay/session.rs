//! Call session state.
//!
//! [`CallSession`] is the single owner of everything a call remembers: the
//! media clock, the open turn window, the in-flight request guard and the
//! playback tracking. It performs no I/O. Every handler takes an input event
//! and returns the [`Effect`]s the runtime must carry out, in order.
//!
//! The handlers live next to the component they implement:
//! - turn taking in `turn.rs`
//! - playback relay in `playback.rs`
//! - barge-in in `interruption.rs`

use std::collections::VecDeque;
use std::sync::Arc;

use super::config::RelayConfig;
use crate::core::realtime::ClientEvent;
use crate::core::telephony::TelephonyOutbound;

/// Side effects requested by a session handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send an event to the AI peer
    ToAi(ClientEvent),
    /// Send a frame to the telephony peer
    ToTelephony(TelephonyOutbound),
    /// Cancel any pending silence timer and start a new one
    RearmSilenceTimer,
    /// Cancel the pending silence timer
    CancelSilenceTimer,
    /// Report [`CallSession::on_flush_elapsed`] for `turn` after the flush delay
    ScheduleFlush { turn: u64 },
}

/// Named turn-taking states, derived from the session fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// No caller audio captured, nothing requested, nothing playing
    Idle,
    /// A turn window is open
    Capturing,
    /// Commit and reply request issued, no reply audio seen yet
    Requested,
    /// Reply audio is being forwarded to the caller
    Playing,
}

/// Open capture window for the caller's current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnWindow {
    pub capture_start_ms: u64,
    pub buffered_ms: u64,
}

impl TurnWindow {
    fn open(at_ms: u64) -> Self {
        Self {
            capture_start_ms: at_ms,
            buffered_ms: 0,
        }
    }

    /// Re-derive the buffered duration from the media clock.
    fn extend_to(&mut self, media_clock_ms: u64) {
        self.buffered_ms = media_clock_ms.saturating_sub(self.capture_start_ms);
    }
}

/// Playback tracking for the reply currently being forwarded.
///
/// `current_reply_id`, `reply_start_ms` and `delivery_markers` are only ever
/// cleared together through [`PlaybackState::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_reply_id: Option<String>,
    /// Response the current item belongs to, when the AI peer named one
    pub current_response_id: Option<String>,
    pub reply_start_ms: Option<u64>,
    pub delivery_markers: VecDeque<String>,
    /// The AI peer reported the reply complete
    pub reply_complete: bool,
}

impl PlaybackState {
    pub fn is_active(&self) -> bool {
        self.current_reply_id.is_some()
    }

    pub(super) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// State for one call.
#[derive(Debug)]
pub struct CallSession {
    pub(super) config: Arc<RelayConfig>,
    pub(super) stream_sid: Option<String>,
    pub(super) media_clock_ms: u64,
    pub(super) turn_window: Option<TurnWindow>,
    pub(super) awaiting_reply: bool,
    pub(super) playback: PlaybackState,
    /// Turn whose commit is waiting on the flush delay
    pub(super) pending_flush: Option<u64>,
    pub(super) turn_seq: u64,
    pub(super) marker_seq: u64,
    /// Reply cut short by barge-in; late fragments for it are dropped
    pub(super) interrupted_reply_id: Option<String>,
    /// Response cut short by barge-in; its late completion is ignored
    pub(super) interrupted_response_id: Option<String>,
}

impl CallSession {
    pub fn new(config: Arc<RelayConfig>) -> Self {
        Self {
            config,
            stream_sid: None,
            media_clock_ms: 0,
            turn_window: None,
            awaiting_reply: false,
            playback: PlaybackState::default(),
            pending_flush: None,
            turn_seq: 0,
            marker_seq: 0,
            interrupted_reply_id: None,
            interrupted_response_id: None,
        }
    }

    /// Telephony stream started.
    ///
    /// A new stream starts from a clean slate: media clock, turn window and
    /// playback state are reset and any pending timer is cancelled.
    pub fn on_start(&mut self, stream_sid: String) -> Vec<Effect> {
        self.stream_sid = Some(stream_sid);
        self.media_clock_ms = 0;
        self.turn_window = None;
        self.awaiting_reply = false;
        self.pending_flush = None;
        self.interrupted_reply_id = None;
        self.interrupted_response_id = None;
        self.playback.reset();
        vec![Effect::CancelSilenceTimer]
    }

    /// Advance the media clock; it never moves backwards.
    pub(super) fn advance_clock(&mut self, timestamp_ms: u64) {
        self.media_clock_ms = self.media_clock_ms.max(timestamp_ms);
        if let Some(window) = self.turn_window.as_mut() {
            window.extend_to(self.media_clock_ms);
        }
    }

    /// Open a turn window at the current media clock if none is open.
    pub(super) fn ensure_window(&mut self) {
        if self.turn_window.is_none() {
            self.turn_window = Some(TurnWindow::open(self.media_clock_ms));
        }
    }

    pub fn phase(&self) -> TurnPhase {
        if self.awaiting_reply {
            TurnPhase::Requested
        } else if self.playback.is_active() {
            TurnPhase::Playing
        } else if self.turn_window.is_some() {
            TurnPhase::Capturing
        } else {
            TurnPhase::Idle
        }
    }

    pub fn stream_sid(&self) -> Option<&str> {
        self.stream_sid.as_deref()
    }

    pub fn media_clock_ms(&self) -> u64 {
        self.media_clock_ms
    }

    pub fn turn_window(&self) -> Option<TurnWindow> {
        self.turn_window
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}
