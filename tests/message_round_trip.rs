//! Integration tests for parsing TMI traffic and serializing it back.
//!
//! Lines are taken from real Twitch chat captures.

use slirc_tmi::{Command, CommandName, Lenient, Message, Source, Tags};

fn parse(line: &str) -> Message {
    line.parse().expect("non-empty line")
}

fn assert_round_trip(line: &str) {
    let message = parse(line);
    let reparsed = parse(&message.to_string());
    assert_eq!(message, reparsed, "round trip of {:?}", line);
}

#[test]
fn test_privmsg_with_tags() {
    let msg = parse(
        "@badge-info=;badges=broadcaster/1;color=#0000FF;display-name=Foo;subscriber=0 \
         :foo!foo@foo.tmi.twitch.tv PRIVMSG #bar :Hello world",
    );
    assert_eq!(msg.tags.display_name, "Foo");
    assert_eq!(msg.tags.color, "#0000FF");
    assert!(!msg.tags.subscriber);
    assert_eq!(msg.nickname(), Some("foo"));
    assert_eq!(msg.command.name, CommandName::Privmsg);
    assert_eq!(msg.command.arguments, vec!["#bar"]);
    assert_eq!(msg.command.data.as_deref(), Some("Hello world"));
}

#[test]
fn test_ping_has_no_source_or_tags() {
    let msg = parse("PING :tmi.twitch.tv");
    assert_eq!(msg.command.name, CommandName::Ping);
    assert!(msg.source.is_none());
    assert!(msg.tags.is_empty());
    assert!(msg.command.arguments.is_empty());
    assert_eq!(msg.text(), "tmi.twitch.tv");
}

#[test]
fn test_command_without_arguments() {
    let msg = parse(":tmi.twitch.tv RECONNECT");
    assert_eq!(msg.command.name, CommandName::Reconnect);
    assert!(msg.command.arguments.is_empty());
    assert!(msg.command.data.is_none());
}

#[test]
fn test_names_reply() {
    let msg = parse(":bot.tmi.twitch.tv 353 bot = #bar :foo bar baz");
    assert_eq!(msg.command.name, CommandName::Numeric(353));
    assert_eq!(msg.command.arguments, vec!["bot", "=", "#bar"]);
    assert_eq!(msg.text().split(' ').count(), 3);
}

#[test]
fn test_unknown_tag_is_ignored() {
    let msg = parse("@foo;bar=1;display-name=Foo;mod=1 :tmi.twitch.tv USERSTATE #bar");
    assert_eq!(msg.tags.display_name, "Foo");
    assert!(msg.tags.moderator);
    assert_eq!(msg.channel(), Some("#bar"));
}

#[test]
fn test_bad_numbers_keep_raw_value() {
    let msg = parse("@bits=lots;tmi-sent-ts=yesterday;slow=30 :a!a@a PRIVMSG #c :cheer");
    assert_eq!(msg.tags.bits, Lenient::Raw("lots".to_string()));
    assert!(msg.tags.timestamp.is_raw());
    assert_eq!(msg.tags.slow.value(), Some(&30));
    assert!(msg.tags.sent_at().is_none());
}

#[test]
fn test_timestamp_tag() {
    let msg = parse("@tmi-sent-ts=1642696567751 :tmi.twitch.tv CLEARCHAT #bar :spammer");
    let sent = msg.tags.sent_at().expect("valid timestamp");
    assert_eq!(sent.timestamp_millis(), 1642696567751);
}

#[test]
fn test_escaped_system_message() {
    let msg = parse(
        "@msg-id=raid;msg-param-viewerCount=9;system-msg=9\\sraiders\\sfrom\\sFoo\\shave\\sjoined! \
         :tmi.twitch.tv USERNOTICE #bar",
    );
    assert_eq!(msg.tags.msg_id, "raid");
    assert_eq!(msg.tags.system_msg, "9 raiders from Foo have joined!");
}

#[test]
fn test_trailing_with_colons() {
    let msg = parse(":a!a@a PRIVMSG #c :time is 12:30 :) ok");
    assert_eq!(msg.text(), "time is 12:30 :) ok");
}

#[test]
fn test_malformed_lines_do_not_fail() {
    for line in ["@", ":", "@ :", "@a=b", ":only.source", "   ", "::: ::: :::"] {
        let msg = Message::parse(line).expect("only empty lines yield nothing");
        let _ = msg.to_string();
    }
    assert!(Message::parse("").is_none());
    assert!(Message::parse("\r\n").is_none());
}

#[test]
fn test_round_trips() {
    for line in [
        "PING :tmi.twitch.tv",
        ":tmi.twitch.tv 001 bot :Welcome, GLHF!",
        ":tmi.twitch.tv CAP * ACK :twitch.tv/commands twitch.tv/membership twitch.tv/tags",
        ":foo!foo@foo.tmi.twitch.tv JOIN #bar",
        ":foo!foo@foo.tmi.twitch.tv PART #bar",
        "@emote-only=0;followers-only=-1;r9k=0;room-id=12345678;slow=0;subs-only=0 :tmi.twitch.tv ROOMSTATE #bar",
        "@badge-info=subscriber/8;badges=subscriber/6,bits/1000;bits=100;emotes=25:0-4,12-16;id=b34ccfc7 \
         :ronni!ronni@ronni.tmi.twitch.tv PRIVMSG #ronni :Kappa Keepo Kappa",
        "@login=foo;target-msg-id=94e6c7ff-bf98-4faa-af5d-7ad633a158a9 :tmi.twitch.tv CLEARMSG #bar :what a great day",
        ":tmi.twitch.tv HOSTTARGET #abc :xyz 10",
    ] {
        assert_round_trip(line);
    }
}

#[test]
fn test_built_message_parses_back() {
    let tags = Tags::parse("display-name=Bot;color=#FF0000");
    let msg = Message::new(Command::new(CommandName::Privmsg).with_arg("#bar").with_data("hi there"))
        .with_tags(tags)
        .with_source(Source::parse("bot!bot@bot.tmi.twitch.tv"));

    assert_eq!(
        msg.to_string(),
        "@display-name=Bot;color=#FF0000 :bot!bot@bot.tmi.twitch.tv PRIVMSG #bar :hi there"
    );
    assert_eq!(parse(msg.raw()), msg);
}
