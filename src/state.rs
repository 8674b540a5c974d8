//! Sans-IO handshake state machine.
//!
//! The machine does not perform I/O. It is fed parsed messages received
//! after the login lines were sent and answers with actions for the caller:
//! forward the message to the dispatcher, finish, or abort.
//!
//! TMI considers a login complete once it has sent eight distinct replies:
//! the `CAP` acknowledgment, numerics `001` through `004`, the MOTD lines
//! `375` and `372`, and `GLOBALUSERSTATE`. They may arrive in any order.
//!
//! # Example
//!
//! ```
//! use slirc_tmi::state::{HandshakeAction, HandshakeMachine};
//! use slirc_tmi::Message;
//!
//! let mut machine = HandshakeMachine::new();
//! let ack = Message::parse(":tmi.twitch.tv CAP * ACK :twitch.tv/tags").unwrap();
//! assert!(machine.feed(&ack).is_empty());
//! assert_eq!(machine.checklist().bits(), 1);
//! ```

use std::fmt;

use crate::command::{
    CommandName, RPL_CREATED, RPL_MOTD, RPL_MOTDSTART, RPL_MYINFO, RPL_WELCOME, RPL_YOURHOST,
};
use crate::Message;

/// Notice texts TMI sends when the token or nickname is rejected.
pub const INVALID_AUTH_NOTICES: &[&str] = &["Improperly formatted auth", "Login authentication failed"];

/// Lifecycle of a session's connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// Created, nothing sent yet.
    #[default]
    Idle,
    /// TCP dial in progress.
    Dialing,
    /// Login lines sent, waiting for the checklist to fill.
    Handshaking,
    /// Handshake complete, read loop not yet running.
    Ready,
    /// The read loop is delivering messages.
    Listening,
    /// Closed by the application or the peer.
    Closed,
    /// Dial or handshake failed.
    Failed,
}

impl ConnectionState {
    /// States in which a socket may be open.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::Dialing | Self::Handshaking | Self::Ready | Self::Listening
        )
    }
}

/// Bitmask of handshake replies received so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checklist(u8);

impl Checklist {
    pub const CAP_ACK: u8 = 1;
    pub const WELCOME: u8 = 1 << 1;
    pub const YOUR_HOST: u8 = 1 << 2;
    pub const CREATED: u8 = 1 << 3;
    pub const MY_INFO: u8 = 1 << 4;
    pub const MOTD_START: u8 = 1 << 5;
    pub const MOTD: u8 = 1 << 6;
    pub const GLOBAL_USER_STATE: u8 = 1 << 7;
    /// All eight replies.
    pub const COMPLETE: u8 = u8::MAX;

    const NAMES: [(u8, &'static str); 8] = [
        (Self::CAP_ACK, "CAP"),
        (Self::WELCOME, "001"),
        (Self::YOUR_HOST, "002"),
        (Self::CREATED, "003"),
        (Self::MY_INFO, "004"),
        (Self::MOTD_START, "375"),
        (Self::MOTD, "372"),
        (Self::GLOBAL_USER_STATE, "GLOBALUSERSTATE"),
    ];

    pub fn new() -> Self {
        Self(0)
    }

    /// The checklist bit a message ticks, if it is a handshake reply.
    pub fn bit_for(name: &CommandName) -> Option<u8> {
        match name {
            CommandName::Cap => Some(Self::CAP_ACK),
            CommandName::GlobalUserState => Some(Self::GLOBAL_USER_STATE),
            CommandName::Numeric(code) => match *code {
                RPL_WELCOME => Some(Self::WELCOME),
                RPL_YOURHOST => Some(Self::YOUR_HOST),
                RPL_CREATED => Some(Self::CREATED),
                RPL_MYINFO => Some(Self::MY_INFO),
                RPL_MOTDSTART => Some(Self::MOTD_START),
                RPL_MOTD => Some(Self::MOTD),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn mark(&mut self, bit: u8) {
        self.0 |= bit;
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self.0 == Self::COMPLETE
    }

    /// Names of the replies still outstanding.
    pub fn missing(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(bit, _)| self.0 & bit == 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for Checklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08b}", self.0)
    }
}

/// What the caller should do with a message fed to the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandshakeAction {
    /// Pass the message on to the event dispatcher.
    Forward,
    /// The checklist is full; start listening.
    Complete,
    /// The server rejected our credentials.
    InvalidToken,
}

/// Tracks handshake progress for one connection attempt.
#[derive(Clone, Debug, Default)]
pub struct HandshakeMachine {
    checklist: Checklist,
    finished: bool,
}

impl HandshakeMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn checklist(&self) -> Checklist {
        self.checklist
    }

    /// True once the machine produced `Complete` or `InvalidToken`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed a parsed message. Returns actions in the order they should be
    /// carried out.
    #[must_use]
    pub fn feed(&mut self, msg: &Message) -> Vec<HandshakeAction> {
        if self.finished {
            return vec![HandshakeAction::Forward];
        }

        let mut actions = Vec::new();
        match Checklist::bit_for(&msg.command.name) {
            Some(bit) => {
                self.checklist.mark(bit);
                // applications read their own identity from this one
                if bit == Checklist::GLOBAL_USER_STATE {
                    actions.push(HandshakeAction::Forward);
                }
                if self.checklist.is_complete() {
                    self.finished = true;
                    actions.push(HandshakeAction::Complete);
                }
            }
            None if is_invalid_auth(msg) => {
                self.finished = true;
                actions.push(HandshakeAction::InvalidToken);
            }
            None => actions.push(HandshakeAction::Forward),
        }
        actions
    }
}

fn is_invalid_auth(msg: &Message) -> bool {
    msg.command.name == CommandName::Notice
        && msg
            .command
            .data
            .as_deref()
            .is_some_and(|text| INVALID_AUTH_NOTICES.contains(&text))
}
