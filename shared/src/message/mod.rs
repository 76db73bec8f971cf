//! Real-time message payloads
//!
//! Wire types exchanged over the WebSocket gateway: outbound
//! [`RealtimeMessage`] envelopes and inbound [`ClientEvent`]s.

mod payload;

pub use payload::{ClientEvent, RealtimeData, RealtimeMessage, RealtimePayload};
