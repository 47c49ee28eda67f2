//! Barge-in handling.

use super::session::{CallSession, Effect};
use crate::core::realtime::ClientEvent;
use crate::core::telephony::TelephonyOutbound;

impl CallSession {
    /// The AI peer detected the caller speaking.
    ///
    /// Only acts while a reply is audibly in progress (marks outstanding and
    /// a reply start recorded). The reply item is truncated at the media
    /// clock position reached since its first fragment, the telephony
    /// peer's playback buffer is cleared, and playback tracking is reset.
    pub fn on_peer_speech_started(&mut self) -> Vec<Effect> {
        let (Some(reply_id), Some(reply_start_ms)) = (
            self.playback.current_reply_id.clone(),
            self.playback.reply_start_ms,
        ) else {
            tracing::trace!("Speech started with no reply playing");
            return Vec::new();
        };
        if self.playback.delivery_markers.is_empty() {
            tracing::trace!(item_id = %reply_id, "Speech started after reply finished playing");
            return Vec::new();
        }

        let elapsed_ms = self.media_clock_ms.saturating_sub(reply_start_ms);
        tracing::info!(item_id = %reply_id, elapsed_ms, "Caller barged in, truncating reply");

        let mut effects = vec![Effect::ToAi(ClientEvent::ConversationItemTruncate {
            item_id: reply_id.clone(),
            content_index: 0,
            audio_end_ms: elapsed_ms,
        })];
        if let Some(stream_sid) = self.stream_sid.as_deref() {
            effects.push(Effect::ToTelephony(TelephonyOutbound::clear(stream_sid)));
        }

        self.interrupted_response_id = self.playback.current_response_id.take();
        self.interrupted_reply_id = Some(reply_id);
        self.playback.reset();
        effects
    }
}
