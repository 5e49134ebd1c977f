//! Built-in reactions to inbound server commands.
//!
//! The dispatcher owns the small amount of session state the protocol
//! needs (the current nick) and turns each parsed message into zero or
//! more outgoing replies plus events for the external sink. Unknown
//! commands are ignored: the protocol is open-ended and a new server-side
//! command must never be an error here.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, trace};

use crate::config::Config;
use crate::event::{ChatEvent, EventSink};
use crate::links;
use crate::message::Message;
use crate::prefix::Prefix;

/// Fixed client identification sent in response to VERSION queries.
pub const VERSION_REPLY: &str = concat!("ircpipe ", env!("CARGO_PKG_VERSION"));

const CTCP_DELIM: char = '\u{1}';

/// Reacts to parsed messages on behalf of one session.
pub struct Dispatcher {
    config: Config,
    nick: String,
    sink: Arc<dyn EventSink>,
}

impl Dispatcher {
    pub fn new(config: Config, sink: Arc<dyn EventSink>) -> Dispatcher {
        let nick = config.nick.clone();
        Dispatcher { config, nick, sink }
    }

    /// The session nick. Diverges from the configured nick after a
    /// collision retry or a caller-requested nick change.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn set_nick(&mut self, nick: &str) {
        self.nick = nick.to_owned();
    }

    /// Reacts to one message, returning the outgoing replies in order.
    pub fn dispatch(&mut self, msg: &Message) -> Vec<Message> {
        match msg.command.as_str() {
            "PING" => self.on_ping(msg),
            "VERSION" => self.on_version(msg),
            "NOTICE" => self.on_notice(msg),
            "PRIVMSG" => {
                self.on_privmsg(msg);
                Vec::new()
            }
            "QUIT" => {
                debug!(prefix = ?msg.raw_prefix, args = ?msg.args, "peer quit");
                Vec::new()
            }
            other => {
                trace!(command = other, "no built-in reaction");
                Vec::new()
            }
        }
    }

    fn on_ping(&self, msg: &Message) -> Vec<Message> {
        let payload = msg.args.first().map(String::as_str).unwrap_or_default();
        vec![Message::pong(payload)]
    }

    /// Custom VERSION reply identifying the client.
    fn on_version(&self, msg: &Message) -> Vec<Message> {
        let args: Vec<&str> = msg.args.first().map(String::as_str).into_iter().collect();
        vec![Message::new(VERSION_REPLY, args)]
    }

    /// NickServ conversation: identify once the service reports the nick
    /// as registered, retry with a mutated nick once it reports the nick
    /// invalid. At most one of the two fires per notice.
    fn on_notice(&mut self, msg: &Message) -> Vec<Message> {
        let from = msg.prefix.as_ref().and_then(Prefix::nick).unwrap_or("");
        if !from.eq_ignore_ascii_case("nickserv") {
            return Vec::new();
        }

        let text = msg.args.get(1).map(|t| t.to_lowercase()).unwrap_or_default();
        if text.contains("registered") {
            let Some(password) = self.config.password.clone() else {
                debug!("nick is registered but no password is configured");
                return Vec::new();
            };
            debug!("identifying with NickServ");
            vec![Message::privmsg("NickServ", &format!("IDENTIFY {password}"))]
        } else if text.contains("invalid") {
            let digit = rand::thread_rng().gen_range(0..10u8);
            let retry = format!("{}{digit}", self.config.nick);
            debug!(nick = %retry, "nick rejected, retrying");
            self.nick = retry.clone();
            vec![Message::nick(&retry)]
        } else {
            Vec::new()
        }
    }

    fn on_privmsg(&self, msg: &Message) {
        // missing target or text is an anomaly, not an error
        let Some(target) = msg.args.first() else {
            trace!("PRIVMSG without a target");
            return;
        };
        let Some(raw_text) = msg.args.get(1).map(String::as_str) else {
            trace!("PRIVMSG without text");
            return;
        };

        let (text, action) = match strip_ctcp_action(raw_text) {
            Some(body) => (body, true),
            None => (raw_text, false),
        };

        let timestamp = Utc::now();
        let url = links::find_url(text).map(str::to_owned);
        if let Some(url) = &url {
            self.sink.on_link(url, target, timestamp);
        }
        self.sink.on_chat(ChatEvent {
            handle: msg.prefix.as_ref().and_then(Prefix::nick).map(str::to_owned),
            target: target.clone(),
            text: text.to_owned(),
            timestamp,
            action,
            url,
        });
    }
}

/// Unwraps a CTCP ACTION envelope (`\x01ACTION <body>\x01`), returning the
/// body when present.
fn strip_ctcp_action(text: &str) -> Option<&str> {
    let mut rest = text.strip_prefix(CTCP_DELIM)?.strip_prefix("ACTION")?;
    rest = rest.strip_prefix(' ').unwrap_or(rest);
    Some(rest.strip_suffix(CTCP_DELIM).unwrap_or(rest))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        chats: Mutex<Vec<ChatEvent>>,
        links: Mutex<Vec<(String, String)>>,
    }

    impl EventSink for RecordingSink {
        fn on_chat(&self, event: ChatEvent) {
            self.chats.lock().unwrap().push(event);
        }

        fn on_link(&self, url: &str, channel: &str, _timestamp: chrono::DateTime<Utc>) {
            self.links
                .lock()
                .unwrap()
                .push((url.to_owned(), channel.to_owned()));
        }
    }

    fn dispatcher(config: Config) -> (Dispatcher, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (Dispatcher::new(config, sink.clone()), sink)
    }

    fn parse(line: &str) -> Message {
        Message::parse(line).unwrap()
    }

    #[test]
    fn test_ping_pong() {
        let (mut d, _) = dispatcher(Config::default());
        let replies = d.dispatch(&parse("PING :tungsten.freenode.net"));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].to_wire(), "PONG tungsten.freenode.net\r\n");
    }

    #[test]
    fn test_version_reply() {
        let (mut d, _) = dispatcher(Config::default());
        let replies = d.dispatch(&parse("VERSION someone"));
        assert_eq!(replies.len(), 1);
        let wire = replies[0].to_wire();
        assert!(wire.starts_with("ircpipe "), "got {wire:?}");
        assert!(wire.ends_with(" someone\r\n"));
    }

    #[test]
    fn test_nickserv_registered_identifies_once() {
        let config = Config::default().with_password("hunter2");
        let (mut d, _) = dispatcher(config);
        let replies = d.dispatch(&parse(
            ":NickServ!s@services NOTICE me :This nickname is registered.",
        ));
        assert_eq!(replies.len(), 1);
        assert_eq!(
            replies[0].to_wire(),
            "PRIVMSG NickServ :IDENTIFY hunter2\r\n"
        );
        assert_eq!(d.nick(), Config::default().nick);
    }

    #[test]
    fn test_nickserv_registered_without_password() {
        let (mut d, _) = dispatcher(Config::default());
        let replies = d.dispatch(&parse(
            ":NickServ!s@services NOTICE me :This nickname is registered.",
        ));
        assert!(replies.is_empty());
    }

    #[test]
    fn test_nickserv_invalid_retries_nick_once() {
        let config = Config::default().with_nick("pipebot").with_password("pw");
        let (mut d, _) = dispatcher(config);
        let replies = d.dispatch(&parse(
            ":NickServ!s@services NOTICE me :Invalid nickname, choose another.",
        ));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].command, "NICK");

        let requested = &replies[0].args[0];
        assert_eq!(requested.len(), "pipebot".len() + 1);
        assert!(requested.starts_with("pipebot"));
        assert!(requested
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_digit()));
        // session nick tracks the retry; the config stays untouched
        assert_eq!(d.nick(), requested);
        assert_eq!(d.config.nick, "pipebot");
    }

    #[test]
    fn test_nickserv_never_both_from_one_notice() {
        let config = Config::default().with_password("pw");
        let (mut d, _) = dispatcher(config);
        // pathological notice containing both keywords: "registered" wins
        let replies = d.dispatch(&parse(
            ":NickServ!s@services NOTICE me :registered but invalid",
        ));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].command, "PRIVMSG");
    }

    #[test]
    fn test_notice_from_other_sender_ignored() {
        let config = Config::default().with_password("pw");
        let (mut d, _) = dispatcher(config);
        let replies = d.dispatch(&parse(
            ":mallory!m@host NOTICE me :this nickname is registered",
        ));
        assert!(replies.is_empty());
    }

    #[test]
    fn test_nickserv_case_insensitive() {
        let config = Config::default().with_password("pw");
        let (mut d, _) = dispatcher(config);
        let replies = d.dispatch(&parse(
            ":nickserv!s@services NOTICE me :This NICKNAME is REGISTERED.",
        ));
        assert_eq!(replies.len(), 1);
    }

    #[test]
    fn test_privmsg_emits_chat_event() {
        let (mut d, sink) = dispatcher(Config::default());
        let replies = d.dispatch(&parse(":alice!a@host PRIVMSG #chan :hello there"));
        assert!(replies.is_empty());

        let chats = sink.chats.lock().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].handle.as_deref(), Some("alice"));
        assert_eq!(chats[0].target, "#chan");
        assert_eq!(chats[0].text, "hello there");
        assert!(!chats[0].action);
        assert_eq!(chats[0].url, None);
        assert!(sink.links.lock().unwrap().is_empty());
    }

    #[test]
    fn test_privmsg_with_link() {
        let (mut d, sink) = dispatcher(Config::default());
        d.dispatch(&parse(
            ":alice!a@host PRIVMSG #chan :check http://example.com/x?y=1 out",
        ));

        let links = sink.links.lock().unwrap();
        assert_eq!(
            *links,
            vec![("http://example.com/x?y=1".to_string(), "#chan".to_string())]
        );

        let chats = sink.chats.lock().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].text, "check http://example.com/x?y=1 out");
        assert_eq!(chats[0].url.as_deref(), Some("http://example.com/x?y=1"));
    }

    #[test]
    fn test_privmsg_ctcp_action() {
        let (mut d, sink) = dispatcher(Config::default());
        d.dispatch(&parse(
            ":alice!a@host PRIVMSG #chan :\u{1}ACTION waves hello\u{1}",
        ));

        let chats = sink.chats.lock().unwrap();
        assert_eq!(chats.len(), 1);
        assert!(chats[0].action);
        assert_eq!(chats[0].text, "waves hello");
    }

    #[test]
    fn test_privmsg_without_text_emits_nothing() {
        let (mut d, sink) = dispatcher(Config::default());
        d.dispatch(&parse(":alice!a@host PRIVMSG #chan"));
        assert!(sink.chats.lock().unwrap().is_empty());
    }

    #[test]
    fn test_privmsg_with_empty_trailing_still_emits() {
        // an empty trailing parameter is present text, not a missing one
        let (mut d, sink) = dispatcher(Config::default());
        d.dispatch(&parse(":alice!a@host PRIVMSG #chan :"));
        let chats = sink.chats.lock().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].text, "");
    }

    #[test]
    fn test_privmsg_without_args() {
        let (mut d, sink) = dispatcher(Config::default());
        d.dispatch(&parse("PRIVMSG"));
        assert!(sink.chats.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_command_ignored() {
        let (mut d, sink) = dispatcher(Config::default());
        assert!(d.dispatch(&parse(":server WALLOPS :routing update")).is_empty());
        assert!(d.dispatch(&parse("QUIT :gone")).is_empty());
        assert!(sink.chats.lock().unwrap().is_empty());
    }

    #[test]
    fn test_strip_ctcp_action_variants() {
        assert_eq!(
            strip_ctcp_action("\u{1}ACTION waves\u{1}"),
            Some("waves")
        );
        // tolerated without the closing delimiter
        assert_eq!(strip_ctcp_action("\u{1}ACTION waves"), Some("waves"));
        assert_eq!(strip_ctcp_action("plain text"), None);
    }
}
