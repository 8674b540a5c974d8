//! TMI message tags.
//!
//! Twitch attaches a fixed vocabulary of metadata to most messages. Rather
//! than keeping tags as untyped key/value pairs, [`Tags`] has one typed
//! field per known wire key. The mapping lives in a static table generated
//! alongside the struct, so every key maps to exactly one field.
//!
//! Decoding never fails: unknown keys are logged and dropped, and values
//! that do not parse as their field's kind are logged and kept raw.
//!
//! Reference: <https://dev.twitch.tv/docs/irc/tags/>

mod escape;
mod value;

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};

pub use self::escape::{escape_tag_value, unescape_tag_value};
pub use self::value::{Lenient, TagInt, TagTime};

use self::value::{decode_bool, decode_int, decode_list, decode_time};

/// How a wire value is decoded, and where it is stored.
#[derive(Clone, Copy)]
pub(crate) enum Field {
    Str(fn(&Tags) -> &String, fn(&mut Tags) -> &mut String),
    Int(fn(&Tags) -> &TagInt, fn(&mut Tags) -> &mut TagInt),
    Bool(fn(&Tags) -> &bool, fn(&mut Tags) -> &mut bool),
    List(fn(&Tags) -> &Vec<String>, fn(&mut Tags) -> &mut Vec<String>),
    Time(fn(&Tags) -> &TagTime, fn(&mut Tags) -> &mut TagTime),
}

/// One row of the wire key table.
#[derive(Clone, Copy)]
pub(crate) struct TagSpec {
    pub(crate) key: &'static str,
    pub(crate) field: Field,
}

macro_rules! tag_type {
    (Str) => { String };
    (Int) => { TagInt };
    (Bool) => { bool };
    (List) => { Vec<String> };
    (Time) => { TagTime };
}

macro_rules! define_tags {
    ($( $(#[$doc:meta])* $field:ident: $kind:ident = $key:literal, )*) => {
        /// Typed record of every tag key TMI is known to send.
        ///
        /// Absent keys hold their type's zero value.
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[non_exhaustive]
        pub struct Tags {
            $( $(#[$doc])* pub $field: tag_type!($kind), )*
        }

        pub(crate) static TAG_TABLE: &[TagSpec] = &[
            $( TagSpec {
                key: $key,
                field: Field::$kind(|t| &t.$field, |t| &mut t.$field),
            }, )*
        ];
    };
}

define_tags! {
    /// Duration of a timeout in seconds; absent for permanent bans.
    ban_duration: Int = "ban-duration",
    /// ID of the chat room (channel).
    room_id: Str = "room-id",
    /// ID of the user who was banned or timed out.
    target_user_id: Str = "target-user-id",
    /// When the server sent the message.
    timestamp: Time = "tmi-sent-ts",

    /// Login of the user whose message was removed.
    login: Str = "login",
    /// ID of the message that was removed.
    target_msg_id: Str = "target-msg-id",

    /// Badge metadata, currently only subscriber months.
    badge_info: List = "badge-info",
    /// Chat badges as `<badge>/<version>`.
    badges: List = "badges",
    /// Emote set IDs the user has access to.
    emote_sets: List = "emote-sets",

    display_name: Str = "display-name",
    /// Name color as `#RRGGBB`, possibly empty.
    color: Str = "color",
    user_id: Str = "user-id",
    /// `""`, `admin`, `global_mod` or `staff`.
    user_type: Str = "user-type",
    turbo: Bool = "turbo",
    subscriber: Bool = "subscriber",
    #[cfg_attr(feature = "serde", serde(rename = "mod"))]
    moderator: Bool = "mod",
    vip: Bool = "vip",

    /// Bits cheered with this message.
    bits: Int = "bits",
    /// Emotes and their positions as `<id>:<start>-<end>`.
    emotes: List = "emotes",
    /// ID of the message itself.
    id: Str = "id",

    pinned_chat_paid_amount: Str = "pinned-chat-paid-amount",
    pinned_chat_paid_currency: Str = "pinned-chat-paid-currency",
    pinned_chat_paid_exponent: Str = "pinned-chat-paid-exponent",
    pinned_chat_paid_level: Str = "pinned-chat-paid-level",
    pinned_chat_paid_is_system_message: Bool = "pinned-chat-paid-is-system-message",

    reply_parent_msg_id: Str = "reply-parent-msg-id",
    reply_parent_user_id: Str = "reply-parent-user-id",
    reply_parent_user_login: Str = "reply-parent-user-login",
    reply_parent_display_name: Str = "reply-parent-display-name",
    reply_parent_msg_body: Str = "reply-parent-msg-body",
    reply_thread_parent_msg_id: Str = "reply-thread-parent-msg-id",
    reply_thread_parent_user_login: Str = "reply-thread-parent-user-login",
    reply_thread_parent_display_name: Str = "reply-thread-parent-display-name",

    emote_only: Bool = "emote-only",
    /// Minutes a user must follow before chatting; `-1` when disabled.
    followers_only: Int = "followers-only",
    r9k: Bool = "r9k",
    /// Seconds between messages in slow mode.
    slow: Int = "slow",
    subs_only: Bool = "subs-only",

    /// Notice type (`sub`, `resub`, `raid`, ...) or NOTICE message id.
    msg_id: Str = "msg-id",
    /// The text Twitch shows in chat for a user notice.
    system_msg: Str = "system-msg",

    msg_param_cumulative_months: Str = "msg-param-cumulative-months",
    msg_param_display_name: Str = "msg-param-displayName",
    msg_param_login: Str = "msg-param-login",
    msg_param_months: Str = "msg-param-months",
    msg_param_promo_gift_total: Str = "msg-param-promo-gift-total",
    msg_param_promo_name: Str = "msg-param-promo-name",
    msg_param_recipient_display_name: Str = "msg-param-recipient-display-name",
    msg_param_recipient_id: Str = "msg-param-recipient-id",
    msg_param_recipient_user_name: Str = "msg-param-recipient-user-name",
    msg_param_sender_login: Str = "msg-param-sender-login",
    msg_param_sender_name: Str = "msg-param-sender-name",
    msg_param_should_share_streak: Str = "msg-param-should-share-streak",
    msg_param_streak_months: Str = "msg-param-streak-months",
    /// `Prime`, `1000`, `2000` or `3000`.
    msg_param_sub_plan: Str = "msg-param-sub-plan",
    msg_param_sub_plan_name: Str = "msg-param-sub-plan-name",
    msg_param_viewer_count: Str = "msg-param-viewerCount",
    msg_param_ritual_name: Str = "msg-param-ritual-name",
    msg_param_threshold: Str = "msg-param-threshold",
    msg_param_gift_months: Str = "msg-param-gift-months",
    msg_param_color: Str = "msg-param-color",
    msg_param_goal_contribution_type: Str = "msg-param-goal-contribution-type",

    /// ID of a whisper message.
    message_id: Str = "message-id",
    /// Whisper thread as `<smaller-user-id>_<larger-user-id>`.
    thread_id: Str = "thread-id",

    client_nonce: Str = "client-nonce",
    flags: Str = "flags",
    custom_reward_id: Str = "custom-reward-id",
    /// First message by this user in the channel.
    first_msg: Bool = "first-msg",
    returning_chatter: Bool = "returning-chatter",
}

fn tag_index() -> &'static HashMap<&'static str, &'static TagSpec> {
    static INDEX: OnceLock<HashMap<&'static str, &'static TagSpec>> = OnceLock::new();
    INDEX.get_or_init(|| TAG_TABLE.iter().map(|spec| (spec.key, spec)).collect())
}

/// Look up the table row for a wire key.
pub(crate) fn lookup(key: &str) -> Option<&'static TagSpec> {
    tag_index().get(key).copied()
}

impl Field {
    fn decode(self, tags: &mut Tags, key: &str, value: &str) {
        let value = unescape_tag_value(value);
        match self {
            Field::Str(_, slot) => *slot(tags) = value,
            Field::Bool(_, slot) => *slot(tags) = decode_bool(&value),
            Field::List(_, slot) => *slot(tags) = decode_list(&value),
            // empty numeric values are common on the wire and mean "unset"
            Field::Int(_, slot) if !value.is_empty() => *slot(tags) = decode_int(key, &value),
            Field::Time(_, slot) if !value.is_empty() => *slot(tags) = decode_time(key, &value),
            Field::Int(..) | Field::Time(..) => {}
        }
    }

    /// Wire form of the stored value, or `None` for the zero value.
    fn encode(self, tags: &Tags) -> Option<String> {
        match self {
            Field::Str(get, _) => Some(get(tags).clone()).filter(|s| !s.is_empty()),
            Field::Bool(get, _) => get(tags).then(|| "1".to_string()),
            Field::List(get, _) => Some(get(tags).join(",")).filter(|s| !s.is_empty()),
            Field::Int(get, _) => {
                let v = get(tags);
                (*v != TagInt::default()).then(|| v.to_string())
            }
            Field::Time(get, _) => match get(tags) {
                v if *v == TagTime::default() => None,
                Lenient::Value(ts) => Some(ts.timestamp_millis().to_string()),
                Lenient::Raw(s) => Some(s.clone()),
            },
        }
    }
}

impl Tags {
    /// Decode a raw tag segment (without the leading `@`).
    ///
    /// ```
    /// use slirc_tmi::Tags;
    ///
    /// let tags = Tags::parse("display-name=Foo;subscriber=1;bits=100");
    /// assert_eq!(tags.display_name, "Foo");
    /// assert!(tags.subscriber);
    /// assert_eq!(tags.bits.value(), Some(&100));
    /// ```
    pub fn parse(raw: &str) -> Tags {
        let mut tags = Tags::default();
        for pair in raw.split(';').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match lookup(key) {
                Some(spec) => spec.field.decode(&mut tags, key, value),
                None => tracing::warn!(key, value, "unknown tag key, ignoring"),
            }
        }
        tags
    }

    /// Encode the non-zero fields back into a tag segment (without `@`).
    ///
    /// Keys are emitted in table order.
    pub fn to_raw(&self) -> String {
        let mut out = String::new();
        for spec in TAG_TABLE {
            let Some(value) = spec.field.encode(self) else {
                continue;
            };
            if !out.is_empty() {
                out.push(';');
            }
            out.push_str(spec.key);
            out.push('=');
            // writing into a String cannot fail
            let _ = escape_tag_value(&mut out, &value);
        }
        out
    }

    /// True when no known tag carries a value.
    pub fn is_empty(&self) -> bool {
        *self == Tags::default()
    }

    /// Version of the named badge, e.g. `badge("subscriber") == Some("12")`.
    pub fn badge(&self, name: &str) -> Option<&str> {
        self.badges.iter().find_map(|b| {
            let (badge, version) = b.split_once('/')?;
            (badge == name).then_some(version)
        })
    }

    /// Time the server sent the message, when present and valid.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        match &self.timestamp {
            v if *v == TagTime::default() => None,
            Lenient::Value(ts) => Some(*ts),
            Lenient::Raw(_) => None,
        }
    }
}

impl std::fmt::Display for Tags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_raw())
    }
}

/// Write `@<tags> ` into `out` unless the record is empty.
pub(crate) fn write_tag_segment(out: &mut String, tags: &Tags) {
    let raw = tags.to_raw();
    if !raw.is_empty() {
        let _ = write!(out, "@{} ", raw);
    }
}
