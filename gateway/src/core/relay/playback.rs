//! Playback relay.
//!
//! Reply audio from the AI peer is forwarded to the telephony peer in receipt
//! order. Every forwarded fragment is followed by a `mark`; the telephony
//! peer echoes each mark back once the audio before it has been played, so
//! the queue of outstanding marks tracks how far playback has progressed.

use super::session::{CallSession, Effect};
use crate::core::telephony::TelephonyOutbound;

impl CallSession {
    /// A fragment of reply audio for item `reply_id` of response `response_id`.
    pub fn on_reply_fragment(
        &mut self,
        response_id: &str,
        reply_id: &str,
        payload: String,
    ) -> Vec<Effect> {
        if self.is_interrupted(response_id, reply_id) {
            tracing::debug!(
                response_id,
                item_id = reply_id,
                "Dropping fragment of interrupted reply"
            );
            return Vec::new();
        }

        let Some(stream_sid) = self.stream_sid.clone() else {
            tracing::warn!(item_id = reply_id, "Reply audio before stream start, dropping");
            return Vec::new();
        };

        // Audio for a live reply answers the outstanding request.
        self.awaiting_reply = false;

        let starts_cycle = match self.playback.current_reply_id.as_deref() {
            None => true,
            Some(current) if current != reply_id => {
                tracing::debug!(
                    previous = current,
                    item_id = reply_id,
                    "Reply item changed mid-playback"
                );
                true
            }
            Some(_) => self.playback.reply_start_ms.is_none(),
        };
        if starts_cycle {
            self.playback.current_reply_id = Some(reply_id.to_string());
            self.playback.current_response_id =
                Some(response_id.to_string()).filter(|id| !id.is_empty());
            self.playback.reply_start_ms = Some(self.media_clock_ms);
            self.playback.reply_complete = false;
            tracing::debug!(
                response_id,
                item_id = reply_id,
                reply_start_ms = self.media_clock_ms,
                "Reply playback started"
            );
        }

        self.marker_seq += 1;
        let marker = format!("reply-{}", self.marker_seq);
        self.playback.delivery_markers.push_back(marker.clone());

        vec![
            Effect::ToTelephony(TelephonyOutbound::media(&stream_sid, payload)),
            Effect::ToTelephony(TelephonyOutbound::mark(&stream_sid, marker)),
        ]
    }

    /// The telephony peer acknowledged a mark.
    ///
    /// Marks are consumed oldest first. An ack naming a different mark than
    /// the oldest outstanding one is a protocol violation; it is logged and
    /// still consumes the oldest mark.
    pub fn on_delivery_ack(&mut self, name: Option<&str>) -> Vec<Effect> {
        match self.playback.delivery_markers.pop_front() {
            None => {
                tracing::warn!(mark = ?name, "Unexpected mark acknowledgment");
            }
            Some(expected) => {
                if let Some(name) = name.filter(|name| *name != expected) {
                    tracing::warn!(
                        expected = %expected,
                        received = name,
                        "Mark acknowledged out of order"
                    );
                }
            }
        }

        self.finish_playback_if_drained();
        Vec::new()
    }

    /// The AI peer finished generating response `response_id`.
    ///
    /// The completion of a response cut short by barge-in says nothing about
    /// the request issued after it, so it leaves the in-flight guard alone.
    pub fn on_reply_done(&mut self, response_id: &str) -> Vec<Effect> {
        if self.is_interrupted(response_id, "") {
            tracing::debug!(response_id, "Interrupted response finished");
            return Vec::new();
        }

        self.awaiting_reply = false;
        let same_response = match (self.playback.current_response_id.as_deref(), response_id) {
            (Some(current), done) if !done.is_empty() => current == done,
            _ => true,
        };
        if self.playback.is_active() && same_response {
            self.playback.reply_complete = true;
            self.finish_playback_if_drained();
        }
        Vec::new()
    }

    /// Whether audio or completion for this response or item belongs to a
    /// reply that barge-in already cut off. Empty ids never match.
    fn is_interrupted(&self, response_id: &str, reply_id: &str) -> bool {
        let hit = |interrupted: &Option<String>, id: &str| {
            !id.is_empty() && interrupted.as_deref() == Some(id)
        };
        hit(&self.interrupted_reply_id, reply_id)
            || hit(&self.interrupted_response_id, response_id)
    }

    /// A complete reply whose marks have all been played ends the cycle.
    fn finish_playback_if_drained(&mut self) {
        if self.playback.reply_complete && self.playback.delivery_markers.is_empty() {
            tracing::debug!(item_id = ?self.playback.current_reply_id, "Reply playback finished");
            self.playback.reset();
        }
    }
}
