//! Routing of received messages to application handlers.
//!
//! A [`Dispatcher`] maps command names to ordered handler lists and keeps a
//! separate wildcard list. Typed registrations such as
//! [`Dispatcher::on_channel_message`] adapt a callback to the uniform
//! [`Handler`] shape when they are registered, so a handler can never be
//! invoked with arguments of the wrong type.
//!
//! ```
//! use slirc_tmi::{Dispatcher, Session, SessionConfig};
//!
//! let mut events = Dispatcher::new();
//! events
//!     .on_channel_join(|_, channel, user| println!("{} joined {}", user, channel))
//!     .on_channel_command_message("hello", |session, channel, user, _args| {
//!         session.send_message(channel, &format!("Hello {}!", user));
//!     });
//! let session = Session::with_dispatcher(SessionConfig::anonymous(), events);
//! # let _ = session;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::command::CommandName;
use crate::{Message, Session, Source, Tags};

/// Uniform handler shape stored in the registry.
pub type Handler = Arc<dyn Fn(&Session, &Message) + Send + Sync>;

/// Command-name registry plus wildcard handlers.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<CommandName, Vec<Handler>>,
    wildcard: Vec<Handler>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<String, usize> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.to_string(), list.len()))
            .collect();
        f.debug_struct("Dispatcher")
            .field("handlers", &counts)
            .field("wildcard", &self.wildcard.len())
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `name`.
    pub fn on<F>(&mut self, name: impl Into<CommandName>, handler: F) -> &mut Self
    where
        F: Fn(&Session, &Message) + Send + Sync + 'static,
    {
        self.push(name.into(), Arc::new(handler))
    }

    /// Append a handler invoked for every dispatched message, after the
    /// command-specific ones.
    pub fn on_any<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Session, &Message) + Send + Sync + 'static,
    {
        self.wildcard.push(Arc::new(handler));
        self
    }

    fn push(&mut self, name: CommandName, handler: Handler) -> &mut Self {
        self.handlers.entry(name).or_default().push(handler);
        self
    }

    /// Handlers to run for `name`: its own in registration order, then the
    /// wildcards in registration order.
    pub fn handlers_for(&self, name: &CommandName) -> Vec<Handler> {
        self.handlers
            .get(name)
            .into_iter()
            .flatten()
            .chain(self.wildcard.iter())
            .cloned()
            .collect()
    }

    /// Number of registered handlers, wildcards included.
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum::<usize>() + self.wildcard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A user joined a channel we are in.
    pub fn on_channel_join<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &str, &Source) + Send + Sync + 'static,
    {
        self.on(CommandName::Join, move |session, msg| {
            match (msg.channel(), msg.source.as_ref()) {
                (Some(channel), Some(source)) => f(session, channel, source),
                _ => skip("channel join", msg),
            }
        })
    }

    /// A user left a channel we are in.
    pub fn on_channel_leave<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &str, &Source) + Send + Sync + 'static,
    {
        self.on(CommandName::Part, move |session, msg| {
            match (msg.channel(), msg.source.as_ref()) {
                (Some(channel), Some(source)) => f(session, channel, source),
                _ => skip("channel leave", msg),
            }
        })
    }

    /// A chat message: channel, sender, text, message id and tags.
    pub fn on_channel_message<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &str, &Source, &str, &str, &Tags) + Send + Sync + 'static,
    {
        self.on(CommandName::Privmsg, move |session, msg| {
            match (msg.channel(), msg.source.as_ref()) {
                (Some(channel), Some(source)) => {
                    f(session, channel, source, msg.text(), &msg.tags.id, &msg.tags)
                }
                _ => skip("channel message", msg),
            }
        })
    }

    /// A chat message of the form `<prefix><cmd> [args...]`.
    ///
    /// The prefix comes from the session's config. `cmd` must be followed by
    /// a space or the end of the message, so `!hello` does not match
    /// `!helloworld`. Arguments are split on whitespace.
    pub fn on_channel_command_message<F>(&mut self, cmd: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Session, &str, &Source, &[String]) + Send + Sync + 'static,
    {
        let cmd = cmd.into();
        self.on_channel_message(move |session, channel, source, text, _, _| {
            if let Some(args) = command_args(text, session.command_prefix(), &cmd) {
                f(session, channel, source, &args);
            }
        })
    }

    /// A `NOTICE`: target (channel or `*`), text and tags.
    pub fn on_notice<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &str, &str, &Tags) + Send + Sync + 'static,
    {
        self.on(CommandName::Notice, move |session, msg| {
            f(session, msg.command.arg(0).unwrap_or(""), msg.text(), &msg.tags)
        })
    }

    /// Subscriptions, raids and other channel events.
    pub fn on_user_notice<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &str, &str, &Tags) + Send + Sync + 'static,
    {
        self.on(CommandName::UserNotice, move |session, msg| match msg.channel() {
            Some(channel) => f(session, channel, msg.text(), &msg.tags),
            None => skip("user notice", msg),
        })
    }

    /// Chat cleared, or one user's messages purged when the target is set.
    pub fn on_clear_chat<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &str, Option<&str>, &Tags) + Send + Sync + 'static,
    {
        self.on(CommandName::ClearChat, move |session, msg| match msg.channel() {
            Some(channel) => f(session, channel, msg.command.data.as_deref(), &msg.tags),
            None => skip("clear chat", msg),
        })
    }

    /// A single message was deleted; the text is the deleted message.
    pub fn on_clear_message<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &str, &str, &Tags) + Send + Sync + 'static,
    {
        self.on(CommandName::ClearMsg, move |session, msg| match msg.channel() {
            Some(channel) => f(session, channel, msg.text(), &msg.tags),
            None => skip("clear message", msg),
        })
    }

    pub fn on_whisper<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &Source, &str, &Tags) + Send + Sync + 'static,
    {
        self.on(CommandName::Whisper, move |session, msg| match msg.source.as_ref() {
            Some(source) => f(session, source, msg.text(), &msg.tags),
            None => skip("whisper", msg),
        })
    }

    /// Our own global identity, sent once during login.
    pub fn on_global_user_state<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &Tags) + Send + Sync + 'static,
    {
        self.on(CommandName::GlobalUserState, move |session, msg| f(session, &msg.tags))
    }

    pub fn on_room_state<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &Tags) + Send + Sync + 'static,
    {
        self.on(CommandName::RoomState, move |session, msg| f(session, &msg.tags))
    }

    /// Our identity in a channel, sent after joining and after each message we send.
    pub fn on_user_state<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session, &str, &Tags) + Send + Sync + 'static,
    {
        self.on(CommandName::UserState, move |session, msg| match msg.channel() {
            Some(channel) => f(session, channel, &msg.tags),
            None => skip("user state", msg),
        })
    }

    /// The server is about to restart. The session does not reconnect by itself.
    pub fn on_reconnect<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        self.on(CommandName::Reconnect, move |session, _| f(session))
    }
}

fn skip(kind: &str, msg: &Message) {
    debug!("skipping {} handler for malformed line: {}", kind, msg.raw());
}

/// Arguments of a chat command, or `None` when `text` is not `<prefix><cmd>`.
fn command_args(text: &str, prefix: &str, cmd: &str) -> Option<Vec<String>> {
    let rest = text.strip_prefix(prefix)?.strip_prefix(cmd)?;
    if !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }
    Some(rest.split_whitespace().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::SessionConfig;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Clone) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        (log, move |entry: &str| sink.lock().unwrap().push(entry.to_string()))
    }

    fn run(events: Dispatcher, line: &str) {
        let session = Session::with_dispatcher(SessionConfig::default(), events);
        session.dispatch(&Message::parse(line).unwrap());
    }

    #[test]
    fn test_command_args() {
        assert_eq!(command_args("!hello", "!", "hello"), Some(vec![]));
        assert_eq!(
            command_args("!hello  big world ", "!", "hello"),
            Some(vec!["big".to_string(), "world".to_string()])
        );
        assert_eq!(command_args("!helloworld", "!", "hello"), None);
        assert_eq!(command_args("hello", "!", "hello"), None);
        assert_eq!(command_args("?hello x", "?", "hello"), Some(vec!["x".to_string()]));
    }

    #[test]
    fn test_order_specific_then_wildcard() {
        let (log, record) = recorder();
        let mut events = Dispatcher::new();
        let (r1, r2, r3, r4) = (record.clone(), record.clone(), record.clone(), record);
        events
            .on_any(move |_, _| r1("any-1"))
            .on("JOIN", move |_, _| r2("join-1"))
            .on_any(move |_, _| r3("any-2"))
            .on_channel_join(move |_, channel, user| r4(&format!("join-2 {} {}", channel, user)));

        run(events, ":foo!foo@foo.tmi.twitch.tv JOIN #bar");
        assert_eq!(
            *log.lock().unwrap(),
            vec!["join-1", "join-2 #bar foo", "any-1", "any-2"]
        );
    }

    #[test]
    fn test_unregistered_command_reaches_only_wildcards() {
        let (log, record) = recorder();
        let mut events = Dispatcher::new();
        let r = record.clone();
        events.on_channel_join(move |_, _, _| r("join"));
        events.on_any(move |_, msg| record(&msg.command.name.to_string()));

        run(events, ":tmi.twitch.tv HOSTTARGET #bar :baz 10");
        assert_eq!(*log.lock().unwrap(), vec!["HOSTTARGET"]);
    }

    #[test]
    fn test_ping_skips_handlers() {
        let (log, record) = recorder();
        let mut events = Dispatcher::new();
        let r = record.clone();
        events.on("PING", move |_, _| r("ping"));
        events.on_any(move |_, _| record("any"));

        run(events, "PING :tmi.twitch.tv");
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_channel_message_arguments() {
        let (log, record) = recorder();
        let mut events = Dispatcher::new();
        events.on_channel_message(move |_, channel, user, text, id, tags| {
            record(&format!("{} {} {} {} {}", channel, user, text, id, tags.display_name))
        });

        run(
            events,
            "@display-name=Foo;id=abc-123 :foo!foo@foo.tmi.twitch.tv PRIVMSG #bar :Hello world",
        );
        assert_eq!(*log.lock().unwrap(), vec!["#bar foo Hello world abc-123 Foo"]);
    }

    #[test]
    fn test_channel_command_uses_session_prefix() {
        let (log, record) = recorder();
        let mut events = Dispatcher::new();
        events.on_channel_command_message("roll", move |_, _, _, args| record(&args.join(",")));

        let config = SessionConfig::default().with_command_prefix("?");
        let session = Session::with_dispatcher(config, events);
        for line in [
            ":a!a@a PRIVMSG #c :?roll 1 20",
            ":a!a@a PRIVMSG #c :!roll 1 6",
            ":a!a@a PRIVMSG #c :?rolls",
            ":a!a@a PRIVMSG #c :?roll",
        ] {
            session.dispatch(&Message::parse(line).unwrap());
        }
        assert_eq!(*log.lock().unwrap(), vec!["1,20", ""]);
    }

    #[test]
    fn test_malformed_join_is_skipped() {
        let (log, record) = recorder();
        let mut events = Dispatcher::new();
        let r = record.clone();
        events.on_channel_join(move |_, _, _| r("join"));
        events.on_any(move |_, _| record("any"));

        run(events, ":foo!foo@foo.tmi.twitch.tv JOIN");
        assert_eq!(*log.lock().unwrap(), vec!["any"]);
    }

    #[test]
    fn test_state_and_moderation_events() {
        let (log, record) = recorder();
        let mut events = Dispatcher::new();
        let (r1, r2, r3, r4, r5, r6) = (
            record.clone(),
            record.clone(),
            record.clone(),
            record.clone(),
            record.clone(),
            record.clone(),
        );
        events
            .on_global_user_state(move |_, tags| r1(&format!("global {}", tags.display_name)))
            .on_room_state(move |_, tags| r2(&format!("room {}", tags.room_id)))
            .on_user_state(move |_, channel, tags| r3(&format!("user {} {}", channel, tags.moderator)))
            .on_clear_chat(move |_, channel, target, _| r4(&format!("clear {} {:?}", channel, target)))
            .on_clear_message(move |_, _, text, tags| r5(&format!("del {} {}", text, tags.login)))
            .on_whisper(move |_, user, text, _| r6(&format!("whisper {} {}", user, text)))
            .on_reconnect(move |_| record("reconnect"));

        let session = Session::with_dispatcher(SessionConfig::default(), events);
        for line in [
            "@display-name=Bot :tmi.twitch.tv GLOBALUSERSTATE",
            "@room-id=42 :tmi.twitch.tv ROOMSTATE #bar",
            "@mod=1 :tmi.twitch.tv USERSTATE #bar",
            ":tmi.twitch.tv CLEARCHAT #bar :spammer",
            ":tmi.twitch.tv CLEARCHAT #bar",
            "@login=spammer :tmi.twitch.tv CLEARMSG #bar :buy followers",
            ":foo!foo@foo.tmi.twitch.tv WHISPER bot :psst",
            ":tmi.twitch.tv RECONNECT",
        ] {
            session.dispatch(&Message::parse(line).unwrap());
        }
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "global Bot",
                "room 42",
                "user #bar true",
                "clear #bar Some(\"spammer\")",
                "clear #bar None",
                "del buy followers spammer",
                "whisper foo psst",
                "reconnect",
            ]
        );
    }

    #[test]
    fn test_notices() {
        let (log, record) = recorder();
        let mut events = Dispatcher::new();
        let r = record.clone();
        events
            .on_notice(move |_, target, text, tags| r(&format!("{} {} {}", target, text, tags.msg_id)))
            .on_user_notice(move |_, channel, text, tags| {
                record(&format!("{} [{}] {}", channel, text, tags.msg_id))
            });

        let session = Session::with_dispatcher(SessionConfig::default(), events);
        for line in [
            "@msg-id=slow_on :tmi.twitch.tv NOTICE #bar :This room is now in slow mode.",
            "@msg-id=raid :tmi.twitch.tv USERNOTICE #bar",
        ] {
            session.dispatch(&Message::parse(line).unwrap());
        }
        assert_eq!(
            *log.lock().unwrap(),
            vec!["#bar This room is now in slow mode. slow_on", "#bar [] raid"]
        );
    }

    #[test]
    fn test_len_and_debug() {
        let mut events = Dispatcher::new();
        assert!(events.is_empty());
        events.on_reconnect(|_| {}).on_any(|_, _| {});
        assert_eq!(events.len(), 2);
        assert!(format!("{:?}", events).contains("RECONNECT"));
    }
}
