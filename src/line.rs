//! CRLF framing for the inbound byte stream.
//!
//! The transport hands over arbitrarily sized chunks; [`LineBuffer`]
//! reassembles them into complete protocol lines, holding any incomplete
//! tail until the rest of it arrives.

/// Accumulates raw transport data and yields complete CRLF-terminated lines.
///
/// Framing happens at the byte level and decoding per complete line, so a
/// chunk boundary may fall anywhere, including inside a multi-byte UTF-8
/// character, without corrupting the line.
#[derive(Debug, Default)]
pub struct LineBuffer {
    tail: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and drains every complete line, in arrival order.
    ///
    /// The bytes after the last CRLF are retained and prepended to the
    /// next chunk, so lines split across reads come out whole. Each
    /// complete line is decoded as UTF-8, with invalid sequences replaced
    /// rather than rejected so one bad byte cannot stall the stream. No
    /// line-length limit is enforced.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> Vec<String> {
        self.tail.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = find_crlf(&self.tail[start..]) {
            let line = &self.tail[start..start + pos];
            lines.push(String::from_utf8_lossy(line).into_owned());
            start += pos + 2;
        }
        self.tail.drain(..start);
        lines
    }

    /// Like [`feed_bytes`](Self::feed_bytes) for chunks already known to
    /// be valid UTF-8.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.feed_bytes(chunk.as_bytes())
    }

    /// The incomplete line bytes currently retained, if any.
    pub fn tail(&self) -> &[u8] {
        &self.tail
    }

    /// Drops the retained tail. Used when a connection is torn down so a
    /// partial line never bleeds into the next session.
    pub fn clear(&mut self) {
        self.tail.clear();
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|window| window == b"\r\n")
}
