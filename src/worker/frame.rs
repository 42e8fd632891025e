use bytes::BytesMut;

/// Reassembles newline-delimited lines from arbitrarily split byte chunks.
///
/// Decoding is lossy: invalid UTF-8 sequences become U+FFFD replacement
/// characters instead of failing the line. A trailing `\r` is trimmed so
/// CRLF input behaves like plain LF.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: BytesMut,
}

impl LineFramer {
    /// Appends a chunk received from the stream.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// The next complete line without its delimiter, or `None` until a full
    /// line is buffered. Call repeatedly after each [`extend`](Self::extend).
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let line = self.buf.split_to(pos + 1);
        Some(decode(&line[..pos]))
    }

    /// Whatever is left once the source closed without a final newline.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = self.buf.split();
        let line = decode(&rest);
        (!line.is_empty()).then_some(line)
    }
}

fn decode(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
