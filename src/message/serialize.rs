//! Serialization of messages back to wire form.

use std::fmt::{self, Write};

use crate::tags::write_tag_segment;

use super::Message;

impl Message {
    /// Wire form of this message without a line ending.
    ///
    /// Parsing the result yields a message equal to `self`.
    pub fn to_raw(&self) -> String {
        let mut out = String::new();
        write_tag_segment(&mut out, &self.tags);
        if let Some(source) = &self.source {
            out.push(':');
            out.push_str(&source.to_raw());
            out.push(' ');
        }
        // writing into a String cannot fail
        let _ = write!(out, "{}", self.command.name);
        for arg in &self.command.arguments {
            out.push(' ');
            out.push_str(arg);
        }
        if let Some(data) = &self.command.data {
            out.push_str(" :");
            out.push_str(data);
        }
        out
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}
