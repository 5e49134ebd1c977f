//! Message origin: the optional leading `:source` on an inbound line.
//!
//! A prefix is either a user in `nick[!user@host]` shape or a bare server
//! name. Classification follows the nick character set: anything that does
//! not look like a nick (a dotted hostname, say) is treated as a server.

use std::fmt;

/// The parsed origin of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    /// A user origin, `nick[!user@host]`.
    User {
        nick: String,
        /// Ident, present only in the full three-part shape.
        user: Option<String>,
        /// Host, present only in the full three-part shape.
        host: Option<String>,
    },
    /// A server origin.
    Server(String),
}

impl Prefix {
    /// Classifies and parses a raw prefix (without the leading `:`).
    pub fn parse(raw: &str) -> Prefix {
        if let Some((nick, rest)) = raw.split_once('!') {
            if let Some((user, host)) = rest.split_once('@') {
                if is_nick(nick) && !user.is_empty() {
                    return Prefix::User {
                        nick: nick.to_owned(),
                        user: Some(user.to_owned()),
                        host: Some(host.to_owned()),
                    };
                }
            }
            return Prefix::Server(raw.to_owned());
        }

        if is_nick(raw) {
            Prefix::User {
                nick: raw.to_owned(),
                user: None,
                host: None,
            }
        } else {
            Prefix::Server(raw.to_owned())
        }
    }

    /// The sender nick, when this is a user origin.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::User { nick, .. } => Some(nick),
            Prefix::Server(_) => None,
        }
    }
}

/// Nick alphabet: alphanumerics plus `_ [ ] \ ` ^ { } | -`.
fn is_nick(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '_' | '[' | ']' | '\\' | '`' | '^' | '{' | '}' | '|' | '-')
        })
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::User { nick, user, host } => {
                f.write_str(nick)?;
                if let (Some(user), Some(host)) = (user, host) {
                    write!(f, "!{user}@{host}")?;
                }
                Ok(())
            }
            Prefix::Server(name) => f.write_str(name),
        }
    }
}
