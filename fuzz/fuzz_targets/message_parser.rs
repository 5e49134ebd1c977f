//! Fuzz target for IRC line parsing.
//!
//! Feeds arbitrary input to the message parser (with and without color
//! stripping first) and ensures it never panics.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

use ircpipe::FormattedStringExt;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        // over 512 bytes is unusual for a single IRC line
        if input.is_empty() || input.len() > 512 {
            return;
        }

        let _ = input.parse::<ircpipe::Message>();

        let stripped = input.strip_formatting();
        let _ = stripped.parse::<ircpipe::Message>();
    }
});
