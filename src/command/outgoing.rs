//! Formatting of client-originated lines.
//!
//! These return the line without its `\r\n` terminator; the sender adds it.

/// Normalize a channel argument to `#login`.
///
/// ```
/// use slirc_tmi::command::outgoing::channel_name;
///
/// assert_eq!(channel_name("#Foo"), "#foo");
/// assert_eq!(channel_name("bar"), "#bar");
/// ```
pub fn channel_name(channel: &str) -> String {
    let login = channel.strip_prefix('#').unwrap_or(channel);
    format!("#{}", login.to_ascii_lowercase())
}

/// `CAP REQ :<caps>`
pub fn cap_req<S: AsRef<str>>(caps: &[S]) -> String {
    let caps: Vec<&str> = caps.iter().map(AsRef::as_ref).collect();
    format!("CAP REQ :{}", caps.join(" "))
}

/// `PASS <token>`
pub fn pass(token: &str) -> String {
    format!("PASS {}", token)
}

/// `NICK <nickname>`
pub fn nick(nickname: &str) -> String {
    format!("NICK {}", nickname)
}

pub fn join(channel: &str) -> String {
    format!("JOIN {}", channel_name(channel))
}

pub fn part(channel: &str) -> String {
    format!("PART {}", channel_name(channel))
}

/// `PRIVMSG #<channel> :<text>`
pub fn privmsg(channel: &str, text: &str) -> String {
    format!("PRIVMSG {} :{}", channel_name(channel), text)
}

/// Reply to a `PING`, echoing its payload when there is one.
pub fn pong(payload: Option<&str>) -> String {
    match payload {
        Some(p) if !p.is_empty() => format!("PONG :{}", p),
        _ => "PONG".to_string(),
    }
}

/// Hide the payload of a `PASS` line for logging.
pub fn redact(line: &str) -> &str {
    if line.starts_with("PASS") {
        "PASS ***"
    } else {
        line
    }
}
