//! Parsed TMI messages.

mod parse;
mod serialize;

use std::str::FromStr;

use crate::command::{Command, CommandName};
use crate::error::MessageParseError;
use crate::source::Source;
use crate::tags::Tags;

use self::parse::LineParts;

/// One line of TMI traffic.
///
/// Constructed once per received line and never mutated by the client.
/// Equality compares tags, source and command; the raw line is ignored so
/// a re-serialized message equals the one it came from.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    raw: String,
    pub tags: Tags,
    pub source: Option<Source>,
    pub command: Command,
}

impl Message {
    /// Parse one raw line.
    ///
    /// Returns `None` only for an empty line. Malformed input produces a
    /// best-effort message rather than an error.
    ///
    /// ```
    /// use slirc_tmi::{CommandName, Message};
    ///
    /// let msg = Message::parse("@display-name=Foo :foo!foo@foo.tmi.twitch.tv PRIVMSG #bar :Hello world").unwrap();
    /// assert_eq!(msg.tags.display_name, "Foo");
    /// assert_eq!(msg.command.name, CommandName::Privmsg);
    /// assert_eq!(msg.command.arguments, vec!["#bar"]);
    /// assert_eq!(msg.command.data.as_deref(), Some("Hello world"));
    /// ```
    pub fn parse(line: &str) -> Option<Message> {
        let parts = LineParts::split(line)?;
        Some(Message {
            raw: line.trim_end_matches(['\r', '\n']).to_string(),
            tags: parts.tags.map(Tags::parse).unwrap_or_default(),
            source: parts.source.map(Source::parse),
            command: Command {
                name: CommandName::from_word(parts.command),
                arguments: parts.arguments.into_iter().map(str::to_string).collect(),
                data: parts.data.map(str::to_string),
            },
        })
    }

    /// Build a message from a command; the raw line is derived from it.
    pub fn new(command: Command) -> Message {
        Message {
            raw: String::new(),
            tags: Tags::default(),
            source: None,
            command,
        }
        .with_raw()
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Tags) -> Message {
        self.tags = tags;
        self.with_raw()
    }

    #[must_use]
    pub fn with_source(mut self, source: Source) -> Message {
        self.source = Some(source);
        self.with_raw()
    }

    fn with_raw(mut self) -> Message {
        self.raw = self.to_raw();
        self
    }

    /// The line this message was parsed from, without its line ending.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn name(&self) -> &CommandName {
        &self.command.name
    }

    /// The channel argument, for channel-scoped commands.
    pub fn channel(&self) -> Option<&str> {
        self.command.channel()
    }

    /// Trailing text, or `""`.
    pub fn text(&self) -> &str {
        self.command.text()
    }

    /// Nickname of the sender, if the source is a user.
    pub fn nickname(&self) -> Option<&str> {
        self.source.as_ref().and_then(Source::nickname)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.tags == other.tags && self.source == other.source && self.command == other.command
    }
}

impl Eq for Message {}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s).ok_or(MessageParseError::EmptyMessage)
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message::new(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_privmsg_scenario() {
        let msg = Message::parse(
            "@badge-info=;badges=broadcaster/1;color=#0000FF;display-name=Foo;subscriber=0 \
             :foo!foo@foo.tmi.twitch.tv PRIVMSG #bar :Hello world",
        )
        .unwrap();
        assert_eq!(msg.tags.display_name, "Foo");
        assert_eq!(msg.nickname(), Some("foo"));
        assert_eq!(msg.command.name, CommandName::Privmsg);
        assert_eq!(msg.command.arguments, vec!["#bar"]);
        assert_eq!(msg.command.data.as_deref(), Some("Hello world"));
        assert_eq!(msg.channel(), Some("#bar"));
    }

    #[test]
    fn test_keeps_raw_line() {
        let msg = Message::parse("PING :tmi.twitch.tv\r\n").unwrap();
        assert_eq!(msg.raw(), "PING :tmi.twitch.tv");
        assert_eq!(msg.name(), &CommandName::Ping);
        assert!(msg.source.is_none());
        assert!(msg.tags.is_empty());
    }

    #[test]
    fn test_server_source_is_host() {
        let msg = Message::parse(":tmi.twitch.tv 001 bot :Welcome, GLHF!").unwrap();
        assert_eq!(msg.source, Some(Source::Host("tmi.twitch.tv".into())));
        assert_eq!(msg.command.name, CommandName::Numeric(1));
        assert_eq!(msg.command.arguments, vec!["bot"]);
    }

    #[test]
    fn test_empty_line_is_nothing() {
        assert!(Message::parse("").is_none());
        assert!("".parse::<Message>().is_err());
    }

    #[test]
    fn test_built_messages_have_raw() {
        let msg = Message::new(Command::new("PRIVMSG").with_arg("#bar").with_data("hi there"))
            .with_source(Source::parse("foo!foo@foo.tmi.twitch.tv"));
        assert_eq!(msg.raw(), ":foo!foo@foo.tmi.twitch.tv PRIVMSG #bar :hi there");
    }

    #[test]
    fn test_equality_ignores_raw() {
        let a = Message::parse("@mod=1;display-name=X :x!x@x PRIVMSG #c :t").unwrap();
        let b = Message::parse("@display-name=X;mod=true :x!x@x PRIVMSG #c :t").unwrap();
        assert_ne!(a.raw(), b.raw());
        assert_eq!(a, b);
    }
}
