//! # slirc-tmi
//!
//! A client for the Twitch Messaging Interface (TMI), the IRC dialect
//! Twitch chat speaks.
//!
//! ## Features
//!
//! - Total, never-failing parser for TMI lines with typed [`Tags`]
//! - Login handshake driven by a sans-IO [`state::HandshakeMachine`]
//! - Tokio [`Session`] with typed event registration through [`Dispatcher`]
//! - Automatic `PONG` replies and ordered, fire-and-forget sends
//! - Optional Helix REST and OAuth clients (`api` feature)

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing messages
//!
//! ```rust
//! use slirc_tmi::{CommandName, Message};
//!
//! let raw = "@badges=broadcaster/1;display-name=Foo :foo!foo@foo.tmi.twitch.tv PRIVMSG #bar :Hello world";
//! let msg: Message = raw.parse().expect("non-empty line");
//!
//! assert_eq!(msg.command.name, CommandName::Privmsg);
//! assert_eq!(msg.tags.badge("broadcaster"), Some("1"));
//! assert_eq!(msg.nickname(), Some("foo"));
//! assert_eq!(msg.to_string(), raw);
//! ```
//!
//! ### Running a bot
//!
//! ```rust,no_run
//! use slirc_tmi::{Dispatcher, Session, SessionConfig};
//!
//! # async fn run() -> slirc_tmi::Result<()> {
//! let mut events = Dispatcher::new();
//! events.on_channel_command_message("ping", |session, channel, _, _| {
//!     session.send_message(channel, "pong");
//! });
//!
//! let config = SessionConfig::new("mybot", "oauth:0123456789abcdef");
//! let session = Session::with_dispatcher(config, events);
//! session.connect().await?;
//! session.join_channel("mychannel");
//! session.closed().await;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod message;
pub mod source;
pub mod state;
pub mod tags;

#[cfg(feature = "tokio")]
pub mod dispatch;
#[cfg(feature = "tokio")]
pub mod session;
#[cfg(feature = "tokio")]
pub mod transport;

#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "api")]
pub mod oauth;

pub use self::command::{Command, CommandName};
pub use self::config::{Keepalive, SessionConfig};
pub use self::error::{Error, MessageParseError, Result};
pub use self::message::Message;
pub use self::source::Source;
pub use self::state::{Checklist, ConnectionState, HandshakeAction, HandshakeMachine};
pub use self::tags::{Lenient, TagInt, TagTime, Tags};

#[cfg(feature = "tokio")]
pub use self::dispatch::{Dispatcher, Handler};
#[cfg(feature = "tokio")]
pub use self::session::Session;
#[cfg(feature = "tokio")]
pub use self::transport::{split_lines, FrameReader};
