//! Connection parameters.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default TMI host.
pub const DEFAULT_HOST: &str = "irc.chat.twitch.tv";
/// Default plaintext TMI port.
pub const DEFAULT_PORT: u16 = 6667;
/// Capabilities requested during the handshake.
pub const DEFAULT_CAPABILITIES: [&str; 3] =
    ["twitch.tv/commands", "twitch.tv/membership", "twitch.tv/tags"];
/// Default handshake deadline.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
/// Default prefix for chat commands such as `!hello`.
pub const DEFAULT_COMMAND_PREFIX: &str = "!";

/// Password sent by anonymous read-only logins. TMI ignores its value.
const ANONYMOUS_PASS: &str = "SCHMOOPIIE";

/// TCP keepalive probe settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keepalive {
    /// Idle time before the first probe.
    pub time: Duration,
    /// Interval between probes.
    pub interval: Duration,
}

impl Default for Keepalive {
    fn default() -> Self {
        Self {
            time: Duration::from_secs(120),
            interval: Duration::from_secs(30),
        }
    }
}

/// Everything a [`Session`](crate::Session) needs to log in.
///
/// `Debug` output hides the token.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    /// Sent as `PASS`, usually `oauth:<token>`.
    pub token: String,
    /// Sent as `NICK`.
    pub nickname: String,
    pub capabilities: Vec<String>,
    pub handshake_timeout: Duration,
    /// Prefix recognized by channel command handlers.
    pub command_prefix: String,
    /// `None` leaves the OS defaults in place.
    pub keepalive: Option<Keepalive>,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &"***")
            .field("nickname", &self.nickname)
            .field("capabilities", &self.capabilities)
            .field("handshake_timeout", &self.handshake_timeout)
            .field("command_prefix", &self.command_prefix)
            .field("keepalive", &self.keepalive)
            .finish()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            token: String::new(),
            nickname: String::new(),
            capabilities: DEFAULT_CAPABILITIES.iter().map(|c| c.to_string()).collect(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            keepalive: Some(Keepalive::default()),
        }
    }
}

impl SessionConfig {
    /// Config for an authenticated login.
    pub fn new(nickname: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    /// Read-only login with a `justinfan` nickname. Such sessions receive
    /// chat but cannot send it.
    pub fn anonymous() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or_default();
        Self::new(format!("justinfan{}", 10_000 + seed % 90_000), ANONYMOUS_PASS)
    }

    pub fn is_anonymous(&self) -> bool {
        self.nickname.starts_with("justinfan")
    }

    #[must_use]
    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_command_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_keepalive(mut self, keepalive: Option<Keepalive>) -> Self {
        self.keepalive = keepalive;
        self
    }

    /// `host:port` as dialed.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
