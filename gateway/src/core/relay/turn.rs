//! Turn-taking controller.
//!
//! Inbound frames open or extend the caller's turn window and rearm the
//! silence timer. A turn closes on local silence, the AI peer's
//! `speech_stopped` signal or the telephony `stop` event, whichever comes
//! first. Closing a turn sets the in-flight guard and, after the flush
//! delay, sends `input_audio_buffer.commit` followed by `response.create`.

use super::session::{CallSession, Effect};
use crate::core::realtime::ClientEvent;

/// What asked for the turn to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnTrigger {
    Silence,
    PeerSpeechStopped,
    ExplicitStop,
}

impl TurnTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silence => "silence",
            Self::PeerSpeechStopped => "peer_speech_stopped",
            Self::ExplicitStop => "explicit_stop",
        }
    }
}

impl CallSession {
    /// Inbound caller audio.
    ///
    /// Frames whose payload cannot be adapted are discarded without touching
    /// the clock or the window.
    pub fn on_audio_frame(&mut self, timestamp_ms: u64, payload: &str) -> Vec<Effect> {
        let audio = match self.config.codec.adapt_inbound(payload) {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(stream_sid = ?self.stream_sid, "Discarding inbound frame: {}", e);
                return Vec::new();
            }
        };

        self.advance_clock(timestamp_ms);
        self.ensure_window();

        let mut effects = vec![Effect::ToAi(ClientEvent::InputAudioBufferAppend { audio })];
        if self.config.turn_detection.uses_silence_timer() {
            effects.push(Effect::RearmSilenceTimer);
        }
        effects
    }

    /// The silence timer fired.
    pub fn on_silence_elapsed(&mut self) -> Vec<Effect> {
        self.try_close_turn(TurnTrigger::Silence)
    }

    /// The AI peer's VAD reported the end of speech.
    pub fn on_peer_speech_stopped(&mut self) -> Vec<Effect> {
        if !self.config.turn_detection.uses_peer_vad() {
            tracing::trace!("Ignoring speech_stopped, peer VAD is not a turn trigger");
            return Vec::new();
        }
        self.try_close_turn(TurnTrigger::PeerSpeechStopped)
    }

    /// The telephony peer sent `stop`.
    pub fn on_explicit_stop(&mut self) -> Vec<Effect> {
        self.try_close_turn(TurnTrigger::ExplicitStop)
    }

    fn try_close_turn(&mut self, trigger: TurnTrigger) -> Vec<Effect> {
        if self.awaiting_reply {
            tracing::debug!(
                trigger = trigger.as_str(),
                "Turn close ignored, a reply is already requested"
            );
            return Vec::new();
        }

        let Some(window) = self.turn_window else {
            tracing::debug!(trigger = trigger.as_str(), "Turn close ignored, no open window");
            return Vec::new();
        };

        if window.buffered_ms < self.config.min_turn_ms {
            tracing::debug!(
                trigger = trigger.as_str(),
                buffered_ms = window.buffered_ms,
                min_turn_ms = self.config.min_turn_ms,
                "Turn too short, keeping window open"
            );
            return Vec::new();
        }

        self.awaiting_reply = true;
        self.turn_seq += 1;
        self.pending_flush = Some(self.turn_seq);

        tracing::info!(
            trigger = trigger.as_str(),
            turn = self.turn_seq,
            buffered_ms = window.buffered_ms,
            "Caller turn ended, requesting reply"
        );

        vec![
            Effect::CancelSilenceTimer,
            Effect::ScheduleFlush {
                turn: self.turn_seq,
            },
        ]
    }

    /// The flush delay for `turn` elapsed; draw the buffer boundary.
    pub fn on_flush_elapsed(&mut self, turn: u64) -> Vec<Effect> {
        if self.pending_flush != Some(turn) {
            tracing::debug!(turn, "Ignoring stale flush");
            return Vec::new();
        }

        self.pending_flush = None;
        self.turn_window = None;

        vec![
            Effect::ToAi(ClientEvent::InputAudioBufferCommit),
            Effect::ToAi(ClientEvent::ResponseCreate),
        ]
    }
}
