//! Fuzz target for TMI line and tag parsing.
//!
//! Parsing is total, so any panic here is a bug.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    if input.len() > 8192 {
        return;
    }

    if let Some(msg) = slirc_tmi::Message::parse(input) {
        let _ = msg.to_string();
        let _ = msg.tags.sent_at();
    }
    let _ = slirc_tmi::Tags::parse(input);
});
