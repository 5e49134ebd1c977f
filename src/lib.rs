//! # ircpipe
//!
//! A client-side engine for the IRC text protocol. One instance owns a
//! single TCP connection: it reassembles the inbound byte stream into
//! CRLF-terminated lines, parses each line into a structured [`Message`],
//! reacts to a small set of built-in server commands (keepalive, NickServ
//! identification, nick-collision retry, version reply), and forwards
//! normalized chat and link events to an external [`EventSink`].
//!
//! What happens downstream of "a chat message arrived" — persistence,
//! queries, access control — is out of scope; the engine only calls into
//! the sink you provide. There is no reconnection policy, no TLS, and no
//! IRCv3 capability negotiation.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chrono::{DateTime, Utc};
//! use ircpipe::{ChatEvent, Client, Config, EventSink};
//!
//! struct Printer;
//!
//! impl EventSink for Printer {
//!     fn on_chat(&self, event: ChatEvent) {
//!         println!("<{}> {}", event.handle.as_deref().unwrap_or("?"), event.text);
//!     }
//!
//!     fn on_link(&self, url: &str, channel: &str, _timestamp: DateTime<Utc>) {
//!         println!("link in {channel}: {url}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> ircpipe::Result<()> {
//!     let config = Config::default()
//!         .with_nick("pipebot")
//!         .with_channels(["#rust"]);
//!
//!     let mut client = Client::connect(config, Arc::new(Printer)).await?;
//!     client.say("#rust", "hello from ircpipe");
//!     client.closed().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Parsing without a connection
//!
//! The protocol pieces are plain functions and usable on their own:
//!
//! ```rust
//! use ircpipe::Message;
//!
//! let msg: Message = ":nick!user@host PRIVMSG #chan :hello world".parse().unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.args, ["#chan", "hello world"]);
//! ```

#![deny(clippy::all)]

#[cfg(feature = "tokio")]
pub mod client;
pub mod colors;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod line;
pub mod links;
pub mod message;
pub mod prefix;

#[cfg(feature = "tokio")]
pub use self::client::{Client, ConnectionState, DEFAULT_QUIT_REASON};
pub use self::colors::FormattedStringExt;
pub use self::config::Config;
pub use self::dispatch::{Dispatcher, VERSION_REPLY};
pub use self::error::{MessageParseError, ProtocolError, Result};
pub use self::event::{ChatEvent, EventSink};
pub use self::line::LineBuffer;
pub use self::links::find_url;
pub use self::message::Message;
pub use self::prefix::Prefix;
