//! Message source (sender identity).

use std::fmt;

/// Who sent a message: a user (`nick!host`) or the server itself (`host`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Source {
    /// A user, e.g. `foo!foo@foo.tmi.twitch.tv`.
    User {
        /// Login name of the user.
        nickname: String,
        /// Everything after the `!`.
        host: String,
    },
    /// A bare host such as `tmi.twitch.tv`.
    Host(String),
}

impl Source {
    /// Parse a source segment (without the leading `:`).
    ///
    /// Never fails: anything without exactly one `!` is treated as a host.
    pub fn parse(s: &str) -> Source {
        let mut parts = s.split('!');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(nickname), Some(host), None) => Source::User {
                nickname: nickname.to_string(),
                host: host.to_string(),
            },
            _ => Source::Host(s.to_string()),
        }
    }

    /// The nickname, if this is a user source.
    pub fn nickname(&self) -> Option<&str> {
        match self {
            Source::User { nickname, .. } => Some(nickname),
            Source::Host(_) => None,
        }
    }

    pub fn host(&self) -> &str {
        match self {
            Source::User { host, .. } | Source::Host(host) => host,
        }
    }

    /// Wire form, as it appears after the `:`.
    pub fn to_raw(&self) -> String {
        match self {
            Source::User { nickname, host } => format!("{}!{}", nickname, host),
            Source::Host(host) => host.clone(),
        }
    }
}

/// Displays the nickname, falling back to the host.
impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::User { nickname, .. } if !nickname.is_empty() => f.write_str(nickname),
            _ => f.write_str(self.host()),
        }
    }
}
