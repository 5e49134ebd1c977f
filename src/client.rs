//! Connection lifecycle: socket ownership, registration, and the session
//! read loop.
//!
//! A [`Client`] drives exactly one IRC session. The socket lives in a
//! spawned task; outgoing operations travel to it over an in-process
//! channel and are fire-and-forget against the transport's write queue.
//! There is no reconnection logic: once the transport closes, the session
//! is over and a fresh [`Client::connect`] call starts the next one.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::colors::FormattedStringExt;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{ProtocolError, Result};
use crate::event::EventSink;
use crate::line::LineBuffer;
use crate::message::Message;

/// Lifecycle of the underlying connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// QUIT sent, waiting for the transport to close.
    Closing,
}

/// Reason attached to QUIT when the caller supplies none.
pub const DEFAULT_QUIT_REASON: &str = "powered by ircpipe";

enum Outgoing {
    Send(Message),
    Quit(String),
}

/// Handle to a running IRC session.
///
/// All outgoing operations are queued; once the session has reached
/// [`ConnectionState::Disconnected`] they become logged no-ops rather than
/// errors. Dropping the client tears the connection down.
pub struct Client {
    tx: mpsc::UnboundedSender<Outgoing>,
    state: watch::Receiver<ConnectionState>,
}

impl Client {
    /// Connects to the configured server and spawns the session task.
    ///
    /// As soon as the transport is up the task registers (NICK, then USER,
    /// then JOIN for every configured channel, in that order) and starts
    /// the read loop. Connection refusal surfaces as an error here; any
    /// later transport failure surfaces as the `Disconnected` state and
    /// the sink's `on_closed` hook.
    pub async fn connect(config: Config, sink: Arc<dyn EventSink>) -> Result<Client> {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        let stream = match TcpStream::connect((config.server.as_str(), config.port)).await {
            Ok(stream) => stream,
            Err(e) => {
                let _ = state_tx.send(ConnectionState::Disconnected);
                return Err(e.into());
            }
        };
        let _ = state_tx.send(ConnectionState::Connected);

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_session(config, sink, stream, state_tx, rx));

        Ok(Client { tx, state: state_rx })
    }

    /// The current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Queues a raw outgoing command.
    pub fn send(&self, message: Message) {
        if self.tx.send(Outgoing::Send(message)).is_err() {
            debug!("send after disconnect dropped");
        }
    }

    pub fn join(&self, channel: &str) {
        self.send(Message::join(channel));
    }

    /// Joins every channel in the list, one JOIN per channel, in order.
    pub fn join_all<I, S>(&self, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for channel in channels {
            self.join(channel.as_ref());
        }
    }

    pub fn part(&self, channel: &str) {
        self.send(Message::part(channel));
    }

    /// Parts every channel in the list, one PART per channel, in order.
    pub fn part_all<I, S>(&self, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for channel in channels {
            self.part(channel.as_ref());
        }
    }

    pub fn nick(&self, nick: &str) {
        self.send(Message::nick(nick));
    }

    /// Sends a PRIVMSG to a channel or user.
    pub fn say(&self, target: &str, text: &str) {
        self.send(Message::privmsg(target, text));
    }

    /// Sends QUIT (with `reason` or [`DEFAULT_QUIT_REASON`]) and closes
    /// the transport.
    pub fn disconnect(&self, reason: Option<&str>) {
        let reason = reason.unwrap_or(DEFAULT_QUIT_REASON).to_owned();
        if self.tx.send(Outgoing::Quit(reason)).is_err() {
            debug!("disconnect on a closed session ignored");
        }
    }

    /// Waits until the session reaches `Disconnected`.
    pub async fn closed(&mut self) {
        while *self.state.borrow_and_update() != ConnectionState::Disconnected {
            if self.state.changed().await.is_err() {
                break;
            }
        }
    }
}

async fn run_session(
    config: Config,
    sink: Arc<dyn EventSink>,
    stream: TcpStream,
    state: watch::Sender<ConnectionState>,
    mut rx: mpsc::UnboundedReceiver<Outgoing>,
) {
    sink.on_connected();

    let mut dispatcher = Dispatcher::new(config.clone(), Arc::clone(&sink));
    let (mut reader, mut writer) = stream.into_split();

    if let Err(e) = register(&mut writer, &config).await {
        warn!(error = %e, "registration failed");
    }

    let mut buffer = LineBuffer::new();
    let mut chunk = [0u8; 4096];

    loop {
        tokio::select! {
            read = reader.read(&mut chunk) => match read {
                Ok(0) => {
                    debug!("server closed the connection");
                    break;
                }
                Ok(n) => {
                    let lines = buffer.feed_bytes(&chunk[..n]);
                    if let Err(e) =
                        handle_lines(lines, &config, &sink, &mut dispatcher, &mut writer).await
                    {
                        warn!(error = %e, "transport write failed");
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "transport read failed");
                    break;
                }
            },
            cmd = rx.recv() => match cmd {
                Some(Outgoing::Send(msg)) => {
                    if msg.command == "NICK" {
                        if let Some(nick) = msg.args.first() {
                            dispatcher.set_nick(nick);
                        }
                    }
                    if let Err(e) = write_message(&mut writer, &config, &msg).await {
                        warn!(error = %e, "transport write failed");
                        break;
                    }
                }
                Some(Outgoing::Quit(reason)) => {
                    let _ = state.send(ConnectionState::Closing);
                    let quit = Message::quit(&reason);
                    if let Err(e) = write_message(&mut writer, &config, &quit).await {
                        debug!(error = %e, "QUIT not delivered");
                    }
                    let _ = writer.shutdown().await;
                    break;
                }
                // client handle dropped; tear the session down
                None => break,
            },
        }
    }

    let _ = state.send(ConnectionState::Disconnected);
    sink.on_closed();
}

/// Initial NICK/USER/JOIN sequence, in the order the protocol expects.
async fn register(writer: &mut OwnedWriteHalf, config: &Config) -> Result<()> {
    let nick = Message::nick(&config.nick);
    write_message(writer, config, &nick).await?;

    let user = Message::user(&config.username, &config.realname);
    write_message(writer, config, &user).await?;

    for channel in &config.channels {
        let join = Message::join(channel);
        write_message(writer, config, &join).await?;
    }
    Ok(())
}

/// Parses and dispatches every complete line from one read, writing any
/// built-in replies back out. A malformed line is skipped, never fatal.
async fn handle_lines(
    lines: Vec<String>,
    config: &Config,
    sink: &Arc<dyn EventSink>,
    dispatcher: &mut Dispatcher,
    writer: &mut OwnedWriteHalf,
) -> Result<()> {
    for line in lines {
        sink.on_line(&line);

        let cooked = if config.strip_colors {
            line.strip_formatting()
        } else {
            line.as_str().into()
        };
        if config.debug {
            debug!(line = %cooked, "<<");
        }

        let msg = match Message::parse(&cooked) {
            Ok(msg) => msg,
            Err(cause) => {
                let err = ProtocolError::InvalidMessage {
                    string: cooked.into_owned(),
                    cause,
                };
                warn!(error = %err, "skipping malformed line");
                continue;
            }
        };

        for reply in dispatcher.dispatch(&msg) {
            write_message(writer, config, &reply).await?;
        }
    }
    Ok(())
}

async fn write_message(
    writer: &mut OwnedWriteHalf,
    config: &Config,
    message: &Message,
) -> Result<()> {
    let wire = message.to_wire();
    if config.debug {
        debug!(line = %wire.trim_end(), ">>");
    }
    writer.write_all(wire.as_bytes()).await?;
    Ok(())
}
