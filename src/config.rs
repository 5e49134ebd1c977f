//! Connection configuration.
//!
//! A [`Config`] is an immutable snapshot taken at construction time. The
//! engine never writes back into it: when the server rejects the configured
//! nick and the engine retries with a mutated one, the new nick lives in the
//! session state, not here.

/// Settings for a single IRC session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server hostname or address.
    pub server: String,
    /// Server port.
    pub port: u16,
    /// Nick requested during registration.
    pub nick: String,
    /// NickServ password, if the nick is registered.
    pub password: Option<String>,
    /// Real name sent in the USER command.
    pub realname: String,
    /// Username (ident) sent in the USER command.
    pub username: String,
    /// Channels joined automatically after registration, in order.
    pub channels: Vec<String>,
    /// Log raw traffic at debug level.
    pub debug: bool,
    /// Strip mIRC formatting/color codes from inbound lines before parsing.
    pub strip_colors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: "irc.libera.chat".to_string(),
            port: 6667,
            nick: "ircpipe".to_string(),
            password: None,
            realname: "ircpipe client".to_string(),
            username: "ircpipe".to_string(),
            channels: Vec::new(),
            debug: false,
            strip_colors: true,
        }
    }
}

impl Config {
    /// Configuration for the given server with defaults for everything else.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = nick.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_realname(mut self, realname: impl Into<String>) -> Self {
        self.realname = realname.into();
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Replaces the auto-join channel list.
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_strip_colors(mut self, strip_colors: bool) -> Self {
        self.strip_colors = strip_colors;
        self
    }
}
