//! Tag value escaping as spoken by TMI.
//!
//! Twitch only ever emits two escapes in tag values: `\s` for a space and
//! `\\` for a literal backslash. Any other backslash sequence is passed
//! through untouched.

use std::fmt::{Result as FmtResult, Write};

/// Escape a tag value for serialization.
pub fn escape_tag_value(f: &mut dyn Write, value: &str) -> FmtResult {
    for c in value.chars() {
        match c {
            ' ' => f.write_str("\\s")?,
            '\\' => f.write_str("\\\\")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Unescape a tag value from wire format.
///
/// Reverses the escaping applied by [`escape_tag_value`].
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars().peekable();
    while let Some(c) = iter.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match iter.peek() {
            Some('s') => {
                iter.next();
                unescaped.push(' ');
            }
            Some('\\') => {
                iter.next();
                unescaped.push('\\');
            }
            _ => unescaped.push('\\'),
        }
    }
    unescaped
}
