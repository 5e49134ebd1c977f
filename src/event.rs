//! Normalized events delivered to the external sink.
//!
//! The engine stops at "a chat message arrived": persisting, indexing, or
//! publishing it belongs to whatever implements [`EventSink`]. The sink
//! contract makes no assumptions about storage or access control.

use chrono::{DateTime, Utc};

/// A chat message normalized for downstream consumption.
///
/// Distinct from [`Message`](crate::Message): this is the payload external
/// persistence consumes, not the raw protocol unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEvent {
    /// Sender nick, when the message carried a user prefix.
    pub handle: Option<String>,
    /// Channel or nick the message was addressed to.
    pub target: String,
    /// Message body, with any CTCP ACTION envelope removed.
    pub text: String,
    /// When the message was processed.
    pub timestamp: DateTime<Utc>,
    /// True for CTCP ACTION ("emote") messages.
    pub action: bool,
    /// First URL embedded in the text, if any.
    pub url: Option<String>,
}

/// Receiver for everything the engine produces.
///
/// `on_chat` and `on_link` carry the normalized payloads; the remaining
/// hooks report connection lifecycle and raw traffic and default to no-ops.
pub trait EventSink: Send + Sync {
    /// A channel or private message arrived.
    fn on_chat(&self, event: ChatEvent);

    /// A message contained an embedded link.
    fn on_link(&self, url: &str, channel: &str, timestamp: DateTime<Utc>);

    /// The transport finished connecting.
    fn on_connected(&self) {}

    /// The transport closed; no further events will follow.
    fn on_closed(&self) {}

    /// A complete raw line arrived, before any parsing.
    fn on_line(&self, _line: &str) {}
}
