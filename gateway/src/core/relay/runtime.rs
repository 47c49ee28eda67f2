//! Per-call relay actor.
//!
//! All inputs for a call (telephony frames, AI events, timer expiries) are
//! funnelled into one mpsc queue and handled in order by a single task that
//! owns the [`CallSession`]. Handlers never block on each other and the
//! session needs no locking.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use super::RelayError;
use super::config::RelayConfig;
use super::session::{CallSession, Effect};
use crate::core::link::PeerLink;
use crate::core::realtime::{ClientEvent, RealtimeSignal, ServerEvent};
use crate::core::telephony::{TelephonyEvent, TelephonyOutbound};

/// Capacity of a call's event queue.
pub const RELAY_EVENT_CAPACITY: usize = 512;

/// Everything a relay session reacts to.
#[derive(Debug)]
pub enum RelayEvent {
    /// Parsed frame from the telephony peer
    Telephony(TelephonyEvent),
    /// Telephony socket closed; `reason` is set on transport errors
    TelephonyClosed { reason: Option<String> },
    /// Signal from the AI connection task
    Ai(RealtimeSignal),
    /// Silence timer fired
    SilenceElapsed { generation: u64 },
    /// Flush delay for a closed turn elapsed
    FlushElapsed { turn: u64 },
}

impl From<RealtimeSignal> for RelayEvent {
    fn from(signal: RealtimeSignal) -> Self {
        Self::Ai(signal)
    }
}

/// Create the event queue for one call.
pub fn event_channel() -> (mpsc::Sender<RelayEvent>, mpsc::Receiver<RelayEvent>) {
    mpsc::channel(RELAY_EVENT_CAPACITY)
}

/// Why a relay session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayExit {
    TelephonyClosed,
    AiClosed { reason: Option<String> },
}

/// The relay actor for one call.
pub struct CallRelay {
    call_id: Uuid,
    config: Arc<RelayConfig>,
    session: CallSession,
    telephony: PeerLink<TelephonyOutbound>,
    ai: PeerLink<ClientEvent>,
    events_tx: mpsc::Sender<RelayEvent>,
    events_rx: mpsc::Receiver<RelayEvent>,
    silence_timer: Option<JoinHandle<()>>,
    silence_generation: u64,
    flush_task: Option<JoinHandle<()>>,
}

impl CallRelay {
    pub fn new(
        call_id: Uuid,
        config: Arc<RelayConfig>,
        telephony: PeerLink<TelephonyOutbound>,
        ai: PeerLink<ClientEvent>,
        events: (mpsc::Sender<RelayEvent>, mpsc::Receiver<RelayEvent>),
    ) -> Self {
        let (events_tx, events_rx) = events;
        Self {
            call_id,
            session: CallSession::new(config.clone()),
            config,
            telephony,
            ai,
            events_tx,
            events_rx,
            silence_timer: None,
            silence_generation: 0,
            flush_task: None,
        }
    }

    /// Run until either peer goes away, then tear the call down.
    pub async fn run(self) -> RelayExit {
        let span = tracing::info_span!("call", call_id = %self.call_id);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(mut self) -> RelayExit {
        tracing::info!(
            codec = %self.config.codec,
            turn_detection = %self.config.turn_detection,
            "Relay session started"
        );

        let exit = loop {
            // The actor holds a sender itself, so the queue never closes under it.
            let Some(event) = self.events_rx.recv().await else {
                break RelayExit::TelephonyClosed;
            };
            if let Some(exit) = self.handle_event(event) {
                break exit;
            }
        };

        self.teardown();
        exit
    }

    fn handle_event(&mut self, event: RelayEvent) -> Option<RelayExit> {
        let effects = match event {
            RelayEvent::Telephony(event) => {
                tracing::trace!(event = event.name(), "Telephony event");
                self.on_telephony(event)
            }
            RelayEvent::TelephonyClosed { reason } => {
                match reason {
                    Some(reason) => tracing::warn!("Telephony socket failed: {}", reason),
                    None => tracing::info!("Telephony peer disconnected"),
                }
                return Some(RelayExit::TelephonyClosed);
            }
            RelayEvent::Ai(RealtimeSignal::Connected) => {
                tracing::info!("AI peer connected");
                Vec::new()
            }
            RelayEvent::Ai(RealtimeSignal::Event(event)) => self.on_ai_event(event),
            RelayEvent::Ai(RealtimeSignal::Closed { reason }) => {
                match &reason {
                    Some(reason) => tracing::warn!("AI peer connection lost: {}", reason),
                    None => tracing::info!("AI peer disconnected"),
                }
                return Some(RelayExit::AiClosed { reason });
            }
            RelayEvent::SilenceElapsed { generation } => {
                if generation != self.silence_generation {
                    tracing::trace!(generation, "Ignoring stale silence timer");
                    Vec::new()
                } else {
                    self.silence_timer = None;
                    self.session.on_silence_elapsed()
                }
            }
            RelayEvent::FlushElapsed { turn } => {
                self.flush_task = None;
                self.session.on_flush_elapsed(turn)
            }
        };

        self.apply(effects);
        None
    }

    fn on_telephony(&mut self, event: TelephonyEvent) -> Vec<Effect> {
        match event {
            TelephonyEvent::Connected { protocol, version } => {
                tracing::debug!(?protocol, ?version, "Telephony handshake");
                Vec::new()
            }
            TelephonyEvent::Start { stream_sid, start } => {
                let call_sid = start.as_ref().and_then(|meta| meta.call_sid.clone());
                match stream_sid.or_else(|| start.and_then(|meta| meta.stream_sid)) {
                    Some(stream_sid) => {
                        tracing::info!(%stream_sid, ?call_sid, "Media stream started");
                        self.session.on_start(stream_sid)
                    }
                    None => {
                        tracing::warn!("Ignoring start event without streamSid");
                        Vec::new()
                    }
                }
            }
            TelephonyEvent::Media { media } => {
                self.session.on_audio_frame(media.timestamp, &media.payload)
            }
            TelephonyEvent::Mark { mark } => self
                .session
                .on_delivery_ack(mark.as_ref().map(|mark| mark.name.as_str())),
            TelephonyEvent::Stop { stream_sid } => {
                let active = self.session.stream_sid();
                if stream_sid.is_some() && stream_sid.as_deref() != active {
                    tracing::warn!(?stream_sid, ?active, "Stop names a different stream");
                }
                tracing::info!(stream_sid = ?active, "Media stream stopped");
                self.session.on_explicit_stop()
            }
            TelephonyEvent::Unknown => {
                tracing::trace!("Ignoring unhandled telephony event");
                Vec::new()
            }
        }
    }

    fn on_ai_event(&mut self, event: ServerEvent) -> Vec<Effect> {
        match event {
            ServerEvent::OutputAudioDelta {
                response_id,
                item_id,
                delta,
                ..
            } => self.session.on_reply_fragment(&response_id, &item_id, delta),
            ServerEvent::ResponseDone { response } => {
                tracing::debug!(
                    response_id = %response.id,
                    status = ?response.status,
                    "AI response done"
                );
                self.session.on_reply_done(&response.id)
            }
            ServerEvent::SpeechStarted { .. } => self.session.on_peer_speech_started(),
            ServerEvent::SpeechStopped { .. } => self.session.on_peer_speech_stopped(),
            ServerEvent::Error { error } => {
                tracing::error!(
                    error_type = %error.error_type,
                    code = ?error.code,
                    "AI peer error: {}",
                    error.message
                );
                Vec::new()
            }
            ServerEvent::SessionCreated { session } => {
                tracing::info!(session_id = ?session.id, model = ?session.model, "AI session created");
                Vec::new()
            }
            ServerEvent::SessionUpdated { .. } => {
                tracing::debug!("AI session configured");
                Vec::new()
            }
            other => {
                tracing::trace!(event = other.kind(), "Ignoring AI event");
                Vec::new()
            }
        }
    }

    /// Carry out effects in order. Peer sends never wait on the peer, so a
    /// stalled connection cannot hold up the event queue.
    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ToAi(event) => {
                    let kind = event.kind();
                    if let Err(e) = self.send_ai(event) {
                        tracing::warn!(event = kind, "Dropping AI event: {}", e);
                    }
                }
                Effect::ToTelephony(frame) => {
                    if let Err(e) = self.send_telephony(frame) {
                        tracing::warn!("Dropping telephony frame: {}", e);
                    }
                }
                Effect::RearmSilenceTimer => self.rearm_silence_timer(),
                Effect::CancelSilenceTimer => self.cancel_silence_timer(),
                Effect::ScheduleFlush { turn } => self.schedule_flush(turn),
            }
        }
    }

    fn send_ai(&self, event: ClientEvent) -> Result<(), RelayError> {
        Ok(self.ai.send(event)?)
    }

    fn send_telephony(&self, frame: TelephonyOutbound) -> Result<(), RelayError> {
        Ok(self.telephony.send(frame)?)
    }

    fn rearm_silence_timer(&mut self) {
        self.cancel_silence_timer();

        let generation = self.silence_generation;
        let delay = self.config.silence_timeout();
        let events = self.events_tx.clone();
        self.silence_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(RelayEvent::SilenceElapsed { generation }).await;
        }));
    }

    fn cancel_silence_timer(&mut self) {
        // Bumping the generation also invalidates an expiry already queued.
        self.silence_generation += 1;
        if let Some(timer) = self.silence_timer.take() {
            timer.abort();
        }
    }

    fn schedule_flush(&mut self, turn: u64) {
        if let Some(previous) = self.flush_task.take() {
            previous.abort();
        }

        let delay = self.config.flush_delay();
        let events = self.events_tx.clone();
        self.flush_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(RelayEvent::FlushElapsed { turn }).await;
        }));
    }

    fn teardown(&mut self) {
        self.cancel_silence_timer();
        if let Some(flush) = self.flush_task.take() {
            flush.abort();
        }

        self.ai.close();
        self.telephony.close();

        tracing::info!(stream_sid = ?self.session.stream_sid(), "Relay session ended");
    }
}
