//! The connection manager.
//!
//! A [`Session`] owns one TMI connection: it dials, performs the login
//! handshake, then runs a background task that reads, parses and
//! dispatches every line until the connection ends. Sessions are cheap to
//! clone; all clones share the same connection and handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::AsyncRead;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::outgoing::{self, redact};
use crate::command::CommandName;
use crate::config::SessionConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::state::{ConnectionState, HandshakeAction, HandshakeMachine};
use crate::transport::{self, normalize, spawn_writer, split_lines, FrameReader, Outbound};
use crate::Message;

/// A TMI client session.
///
/// ```no_run
/// use slirc_tmi::{Dispatcher, Session, SessionConfig};
///
/// # async fn run() -> slirc_tmi::Result<()> {
/// let mut events = Dispatcher::new();
/// events.on_channel_message(|_, channel, user, text, _, _| {
///     println!("[{}] {}: {}", channel, user, text);
/// });
///
/// let session = Session::with_dispatcher(SessionConfig::anonymous(), events);
/// session.connect().await?;
/// session.join_channel("twitch");
/// session.closed().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    config: SessionConfig,
    dispatcher: Mutex<Dispatcher>,
    conn: Mutex<Connection>,
}

/// Per-connection state. `generation` tells a finished read loop whether
/// the connection it served is still the current one.
#[derive(Default)]
struct Connection {
    state: ConnectionState,
    generation: u64,
    outbound: Option<Outbound>,
    cancel: Option<CancellationToken>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("nickname", &self.inner.config.nickname)
            .field("address", &self.inner.config.address())
            .field("state", &self.state())
            .finish()
    }
}

impl Session {
    /// A session with no handlers registered yet.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_dispatcher(config, Dispatcher::new())
    }

    /// A session that dispatches through `dispatcher`.
    pub fn with_dispatcher(config: SessionConfig, dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                dispatcher: Mutex::new(dispatcher),
                conn: Mutex::new(Connection::default()),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Prefix recognized by channel command handlers.
    pub fn command_prefix(&self) -> &str {
        &self.inner.config.command_prefix
    }

    pub fn state(&self) -> ConnectionState {
        lock(&self.inner.conn).state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Listening
    }

    /// Add handlers after construction, including from inside a handler.
    ///
    /// Handlers added while a message is being dispatched take effect from
    /// the next message.
    pub fn register<F>(&self, f: F)
    where
        F: FnOnce(&mut Dispatcher),
    {
        f(&mut lock(&self.inner.dispatcher));
    }

    /// Dial, log in and start the read loop.
    ///
    /// Resolves once the server has acknowledged the login. Messages other
    /// than handshake replies that arrive before then are dispatched as
    /// usual. On failure the socket is closed and `connect` may be called
    /// again.
    pub async fn connect(&self) -> Result<()> {
        let (generation, cancel) = {
            let mut conn = lock(&self.inner.conn);
            if conn.state.is_active() {
                return Err(Error::AlreadyConnected);
            }
            conn.state = ConnectionState::Dialing;
            conn.generation += 1;
            let cancel = CancellationToken::new();
            conn.cancel = Some(cancel.clone());
            (conn.generation, cancel)
        };

        let config = &self.inner.config;
        let addr = config.address();
        info!("connecting to {}", addr);
        let dialed = tokio::select! {
            _ = cancel.cancelled() => None,
            dialed = transport::dial(&addr, config.keepalive) => Some(dialed),
        };
        let stream = match dialed {
            Some(Ok(stream)) => stream,
            Some(Err(source)) => {
                warn!("dial {} failed: {}", addr, source);
                self.settle(generation, ConnectionState::Failed);
                return Err(Error::Dial { addr, source });
            }
            None => {
                debug!("closed while dialing {}", addr);
                self.settle(generation, ConnectionState::Closed);
                return Err(Error::ConnectionClosed);
            }
        };

        let (read_half, writer) = {
            let mut conn = lock(&self.inner.conn);
            // closed while the dial was completing; the stream is dropped
            if conn.generation != generation
                || conn.state == ConnectionState::Closed
                || cancel.is_cancelled()
            {
                return Err(Error::ConnectionClosed);
            }
            let (read_half, write_half) = stream.into_split();
            let (outbound, writer) = spawn_writer(write_half, cancel.clone());
            conn.outbound = Some(outbound);
            conn.state = ConnectionState::Handshaking;
            (read_half, writer)
        };

        self.send_command(outgoing::cap_req(config.capabilities.as_slice()));
        self.send_command(outgoing::pass(&config.token));
        self.send_command(outgoing::nick(&config.nickname));

        let mut reader = FrameReader::new(read_half);
        if let Err(e) = self.handshake(&mut reader, &cancel).await {
            warn!("login as {} failed: {}", config.nickname, e);
            cancel.cancel();
            self.settle(generation, ConnectionState::Failed);
            drop(reader);
            // the write half is closed once the writer task has exited
            let _ = writer.await;
            return Err(e);
        }

        info!("logged in as {}", config.nickname);
        {
            let mut conn = lock(&self.inner.conn);
            // closed while the last handshake lines were dispatched
            if conn.generation != generation || conn.state == ConnectionState::Closed {
                return Err(Error::ConnectionClosed);
            }
            conn.state = ConnectionState::Ready;
        }
        self.start_listening(reader, cancel, generation);
        Ok(())
    }

    fn start_listening<R>(&self, reader: FrameReader<R>, cancel: CancellationToken, generation: u64)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        lock(&self.inner.conn).state = ConnectionState::Listening;
        tokio::spawn(listen(self.clone(), reader, cancel, generation));
    }

    async fn handshake<R>(&self, reader: &mut FrameReader<R>, cancel: &CancellationToken) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let timeout = self.inner.config.handshake_timeout;
        let deadline = Instant::now() + timeout;
        let mut machine = HandshakeMachine::new();

        loop {
            let read = tokio::select! {
                _ = cancel.cancelled() => return Err(Error::ConnectionClosed),
                read = tokio::time::timeout_at(deadline, reader.read_chunk()) => read,
            };
            let chunk = match read {
                Err(_) => {
                    debug!(
                        checklist = %machine.checklist(),
                        missing = ?machine.checklist().missing(),
                        "handshake deadline elapsed"
                    );
                    return Err(Error::HandshakeTimeout(timeout));
                }
                Ok(Err(e)) => return Err(Error::Io(e)),
                Ok(Ok(None)) => return Err(Error::ConnectionClosed),
                Ok(Ok(Some(chunk))) => chunk,
            };

            // lines after the final reply in the same chunk are still delivered
            let mut complete = false;
            for line in split_lines(&chunk) {
                let Some(msg) = Message::parse(line) else {
                    continue;
                };
                debug!(">> {}", line);
                for action in machine.feed(&msg) {
                    match action {
                        HandshakeAction::Forward => self.dispatch(&msg),
                        HandshakeAction::Complete => complete = true,
                        HandshakeAction::InvalidToken => return Err(Error::InvalidToken),
                    }
                }
            }
            if complete {
                return Ok(());
            }
        }
    }

    /// Close the connection. The read loop exits without error.
    pub fn close(&self) {
        let mut conn = lock(&self.inner.conn);
        if let Some(cancel) = conn.cancel.take() {
            info!("closing connection");
            cancel.cancel();
        }
        conn.outbound = None;
        if conn.state.is_active() {
            conn.state = ConnectionState::Closed;
        }
    }

    /// Wait until the current connection has ended, by `close` or by the
    /// server. Returns immediately when there is no connection.
    pub async fn closed(&self) {
        let cancel = lock(&self.inner.conn).cancel.clone();
        if let Some(cancel) = cancel {
            cancel.cancelled().await;
        }
    }

    /// Record the end of connection `generation`, unless a newer one exists.
    fn settle(&self, generation: u64, state: ConnectionState) {
        let mut conn = lock(&self.inner.conn);
        if conn.generation != generation {
            return;
        }
        conn.outbound = None;
        conn.cancel = None;
        if conn.state != ConnectionState::Closed {
            conn.state = state;
        }
    }

    /// Deliver a message to handlers as if it had just been received.
    ///
    /// `PING` is answered with `PONG` and reaches no handler. Everything
    /// else goes to the handlers registered for its command, then to the
    /// wildcard handlers.
    pub fn dispatch(&self, msg: &Message) {
        if msg.command.name == CommandName::Ping {
            self.send_command(outgoing::pong(msg.command.data.as_deref()));
            return;
        }
        // handlers run without the lock so they may register more
        let handlers = lock(&self.inner.dispatcher).handlers_for(&msg.command.name);
        for handler in handlers {
            handler(self, msg);
        }
    }

    /// Queue a raw command line such as `PRIVMSG #foo :hi`.
    ///
    /// A missing `\r\n` is added; an empty command is ignored. Failures are
    /// logged, never returned.
    pub fn send_command(&self, command: impl AsRef<str>) {
        let command = command.as_ref();
        let Some(line) = normalize(command) else {
            return;
        };
        let conn = lock(&self.inner.conn);
        match &conn.outbound {
            Some(tx) => {
                if tx.send(line).is_err() {
                    warn!("connection closed, dropping '{}'", redact(command.trim_end()));
                }
            }
            None => warn!("not connected, dropping '{}'", redact(command.trim_end())),
        }
    }

    /// Send a chat message to `channel`; the `#` is optional.
    pub fn send_message(&self, channel: &str, text: &str) {
        self.send_command(outgoing::privmsg(channel, text));
    }

    /// Join `channel`; the `#` is optional.
    pub fn join_channel(&self, channel: &str) {
        self.send_command(outgoing::join(channel));
    }

    /// Leave `channel`; the `#` is optional.
    pub fn leave_channel(&self, channel: &str) {
        self.send_command(outgoing::part(channel));
    }
}

async fn listen<R>(
    session: Session,
    mut reader: FrameReader<R>,
    cancel: CancellationToken,
    generation: u64,
) where
    R: AsyncRead + Unpin,
{
    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => break,
            chunk = reader.read_chunk() => chunk,
        };
        match chunk {
            Ok(Some(chunk)) => {
                for line in split_lines(&chunk) {
                    if let Some(msg) = Message::parse(line) {
                        debug!(">> {}", line);
                        session.dispatch(&msg);
                    }
                }
            }
            Ok(None) => {
                info!("connection closed by server");
                break;
            }
            Err(e) => {
                warn!("read failed, stopping: {}", e);
                break;
            }
        }
    }
    cancel.cancel();
    session.settle(generation, ConnectionState::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new(SessionConfig::default());
        assert_eq!(session.state(), ConnectionState::Idle);
        assert!(!session.is_connected());
        assert_eq!(session.command_prefix(), "!");
    }

    #[test]
    fn test_send_without_connection_is_dropped() {
        let session = Session::new(SessionConfig::default());
        session.send_command("PRIVMSG #foo :hi");
        session.send_command("");
        session.send_message("foo", "hi");
    }

    #[test]
    fn test_close_without_connection() {
        let session = Session::new(SessionConfig::default());
        session.close();
        assert_eq!(session.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_closed_returns_without_connection() {
        Session::new(SessionConfig::default()).closed().await;
    }

    #[test]
    fn test_late_registration_from_handler() {
        let session = Session::new(SessionConfig::default());
        session.register(|events| {
            events.on_reconnect(|session| {
                session.register(|events| {
                    events.on_reconnect(|_| {});
                });
            });
        });
        let msg = Message::parse(":tmi.twitch.tv RECONNECT").unwrap();
        session.dispatch(&msg);
        session.dispatch(&msg);
        assert_eq!(lock(&session.inner.dispatcher).len(), 3);
    }

    #[tokio::test]
    async fn test_dial_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = SessionConfig::new("bot", "oauth:x").with_address("127.0.0.1", port);
        let session = Session::new(config);
        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, Error::Dial { .. }));
        assert_eq!(session.state(), ConnectionState::Failed);
    }
}
