//! Command names understood by the client.

use std::fmt;
use std::str::FromStr;

/// The command word of a TMI line.
///
/// Known words get their own variant; numeric replies keep their code and
/// anything else is preserved verbatim in [`CommandName::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandName {
    /// Capability negotiation reply (`CAP * ACK ...`).
    Cap,
    /// Keep-alive probe sent by the server.
    Ping,
    /// Keep-alive response.
    Pong,
    Pass,
    Nick,
    /// A user joined a channel.
    Join,
    /// A user left a channel.
    Part,
    /// Chat message in a channel.
    Privmsg,
    /// Server notice, including authentication failures.
    Notice,
    /// All messages, or all of one user's messages, were removed.
    ClearChat,
    /// A single message was removed.
    ClearMsg,
    /// Sent once after a successful login.
    GlobalUserState,
    HostTarget,
    /// The server is about to go down for maintenance.
    Reconnect,
    /// Chat room settings.
    RoomState,
    /// Subscriptions, raids and similar events.
    UserNotice,
    /// Our own state in a channel.
    UserState,
    Whisper,
    /// A three-digit numeric reply.
    Numeric(u16),
    /// Any other command word.
    Other(String),
}

/// `RPL_WELCOME`
pub const RPL_WELCOME: u16 = 1;
/// `RPL_YOURHOST`
pub const RPL_YOURHOST: u16 = 2;
/// `RPL_CREATED`
pub const RPL_CREATED: u16 = 3;
/// `RPL_MYINFO`
pub const RPL_MYINFO: u16 = 4;
/// `RPL_NAMREPLY`
pub const RPL_NAMREPLY: u16 = 353;
/// `RPL_ENDOFNAMES`
pub const RPL_ENDOFNAMES: u16 = 366;
/// `RPL_MOTD`
pub const RPL_MOTD: u16 = 372;
/// `RPL_MOTDSTART`
pub const RPL_MOTDSTART: u16 = 375;
/// `RPL_ENDOFMOTD`
pub const RPL_ENDOFMOTD: u16 = 376;

impl CommandName {
    /// Map a command word to its variant. Matching is case-sensitive, as
    /// TMI always sends upper case.
    pub fn from_word(word: &str) -> CommandName {
        match word {
            "CAP" => Self::Cap,
            "PING" => Self::Ping,
            "PONG" => Self::Pong,
            "PASS" => Self::Pass,
            "NICK" => Self::Nick,
            "JOIN" => Self::Join,
            "PART" => Self::Part,
            "PRIVMSG" => Self::Privmsg,
            "NOTICE" => Self::Notice,
            "CLEARCHAT" => Self::ClearChat,
            "CLEARMSG" => Self::ClearMsg,
            "GLOBALUSERSTATE" => Self::GlobalUserState,
            "HOSTTARGET" => Self::HostTarget,
            "RECONNECT" => Self::Reconnect,
            "ROOMSTATE" => Self::RoomState,
            "USERNOTICE" => Self::UserNotice,
            "USERSTATE" => Self::UserState,
            "WHISPER" => Self::Whisper,
            w if w.len() == 3 && w.bytes().all(|b| b.is_ascii_digit()) => {
                // three ASCII digits always fit
                Self::Numeric(w.parse().unwrap_or_default())
            }
            w => Self::Other(w.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }

    /// The command word, or `None` for numerics, which have no fixed text.
    fn word(&self) -> Option<&str> {
        Some(match self {
            Self::Cap => "CAP",
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::Pass => "PASS",
            Self::Nick => "NICK",
            Self::Join => "JOIN",
            Self::Part => "PART",
            Self::Privmsg => "PRIVMSG",
            Self::Notice => "NOTICE",
            Self::ClearChat => "CLEARCHAT",
            Self::ClearMsg => "CLEARMSG",
            Self::GlobalUserState => "GLOBALUSERSTATE",
            Self::HostTarget => "HOSTTARGET",
            Self::Reconnect => "RECONNECT",
            Self::RoomState => "ROOMSTATE",
            Self::UserNotice => "USERNOTICE",
            Self::UserState => "USERSTATE",
            Self::Whisper => "WHISPER",
            Self::Numeric(_) => return None,
            Self::Other(s) => s,
        })
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(code) => write!(f, "{:03}", code),
            other => f.write_str(other.word().unwrap_or_default()),
        }
    }
}

impl From<&str> for CommandName {
    fn from(s: &str) -> Self {
        Self::from_word(s)
    }
}

impl FromStr for CommandName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_word(s))
    }
}
