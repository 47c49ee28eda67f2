pub mod audio;
pub mod link;
pub mod realtime;
pub mod relay;
pub mod telephony;

// Re-export commonly used types for convenience
pub use audio::{AudioCodecMode, AudioError};
pub use link::{LinkCommand, LinkError, LinkReceiver, PeerLink};
pub use realtime::{OpenAIRealtime, RealtimeError, RealtimeResult, RealtimeSignal};
pub use relay::{CallRelay, RelayConfig, RelayError, RelayEvent, RelayExit, TurnDetectionMode};
pub use telephony::{TELEPHONY_PEER, TelephonyEvent, TelephonyOutbound};
