//! Parsing and serialization of single IRC protocol lines.
//!
//! The grammar is `[':' prefix SPACE] command SPACE params`, with
//! `params = *( SPACE middle ) [ SPACE ':' trailing ]`. The trailing
//! parameter is the only one allowed to contain spaces; parsing keeps it
//! verbatim, and serialization re-applies the `:` marker whenever the last
//! argument needs it, so the two directions round-trip exactly.

use std::fmt;
use std::str::FromStr;

use crate::error::MessageParseError;
use crate::prefix::Prefix;

/// One parsed (or to-be-serialized) IRC message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Parsed origin, when the line carried a prefix.
    pub prefix: Option<Prefix>,
    /// The prefix exactly as received, without the leading `:`.
    pub raw_prefix: Option<String>,
    /// Command token, uppercased.
    pub command: String,
    /// Command token as it appeared on the wire.
    pub raw_command: String,
    /// Ordered parameters; the trailing parameter, if any, is last.
    pub args: Vec<String>,
}

impl Message {
    /// A prefix-less outgoing message.
    pub fn new<I, S>(command: &str, args: I) -> Message
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Message {
            prefix: None,
            raw_prefix: None,
            command: command.to_string(),
            raw_command: command.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn privmsg(target: &str, text: &str) -> Message {
        Message::new("PRIVMSG", [target, text])
    }

    pub fn join(channel: &str) -> Message {
        Message::new("JOIN", [channel])
    }

    pub fn part(channel: &str) -> Message {
        Message::new("PART", [channel])
    }

    pub fn nick(nick: &str) -> Message {
        Message::new("NICK", [nick])
    }

    pub fn pong(payload: &str) -> Message {
        Message::new("PONG", [payload])
    }

    pub fn quit(reason: &str) -> Message {
        Message::new("QUIT", [reason])
    }

    /// Registration USER command: `USER <username> 8 * :<realname>`.
    pub fn user(username: &str, realname: &str) -> Message {
        Message::new("USER", [username, "8", "*", realname])
    }

    /// Parses one protocol line (trailing CR/LF tolerated).
    ///
    /// Pure and infallible short of a missing command token; a line that
    /// yields no command at all is malformed and reported as
    /// [`MessageParseError::MissingCommand`].
    pub fn parse(line: &str) -> Result<Message, MessageParseError> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        let mut prefix = None;
        let mut raw_prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let end = stripped
                .find(char::is_whitespace)
                .unwrap_or(stripped.len());
            let raw = &stripped[..end];
            if !raw.is_empty() {
                prefix = Some(Prefix::parse(raw));
                raw_prefix = Some(raw.to_owned());
            }
            rest = stripped[end..].trim_start();
        }

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let raw_command = &rest[..end];
        if raw_command.is_empty() {
            return Err(MessageParseError::MissingCommand);
        }
        rest = rest[end..].trim_start();

        // A trailing parameter starts either at a leading ':' or at the
        // first ':' that follows whitespace; everything after it is kept
        // verbatim, spaces included.
        let (middle, trailing) = if let Some(t) = rest.strip_prefix(':') {
            ("", Some(t))
        } else if let Some(pos) = rest.find(" :") {
            (&rest[..pos], Some(&rest[pos + 2..]))
        } else {
            (rest, None)
        };

        let mut args: Vec<String> = middle
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        if let Some(t) = trailing {
            args.push(t.to_owned());
        }

        Ok(Message {
            prefix,
            raw_prefix,
            command: raw_command.to_uppercase(),
            raw_command: raw_command.to_owned(),
            args,
        })
    }

    /// The complete wire form, CRLF included.
    pub fn to_wire(&self) -> String {
        format!("{self}\r\n")
    }
}

/// Whether an argument must be sent as the trailing parameter.
fn needs_trailing(arg: &str) -> bool {
    arg.is_empty() || arg.starts_with(':') || arg.contains(char::is_whitespace)
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(raw) = &self.raw_prefix {
            write!(f, ":{raw} ")?;
        }
        f.write_str(&self.command)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i + 1 == self.args.len() && needs_trailing(arg) {
                write!(f, " :{arg}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Message, MessageParseError> {
        Message::parse(s)
    }
}
