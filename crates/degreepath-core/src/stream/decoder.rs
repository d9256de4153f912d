//! Incremental UTF-8 decoding and line assembly.
//!
//! The response body arrives as arbitrary byte chunks; a chunk boundary
//! may split a multi-byte character or a line. The decoder carries the
//! undecodable tail of each chunk forward and applies it before the next
//! chunk is parsed, so lines come out exactly as the server wrote them
//! regardless of how the network fragmented them.

/// Stateful byte-to-line decoder.
///
/// Feed chunks with [`push`](Self::push); each call returns the complete
/// lines that became available. Call [`flush`](Self::flush) once at stream
/// end to recover a trailing line that was never newline-terminated.
#[derive(Debug, Default)]
pub struct Utf8LineDecoder {
    /// Bytes held back because they end mid-character.
    carry: Vec<u8>,
    /// Decoded text of the current, not-yet-terminated line.
    partial: String,
}

impl Utf8LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning every newline-terminated line completed
    /// by it. Line terminators are stripped; a `\r` before the `\n` is
    /// trimmed as well.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);
        let buf = std::mem::take(&mut self.carry);
        let mut rest = buf.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.partial.push_str(text);
                    rest = &[];
                    break;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    self.partial.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        // Incomplete character at the end of the chunk:
                        // hold the bytes until the next chunk completes it.
                        None => {
                            rest = tail;
                            break;
                        }
                        // Genuinely invalid sequence: replace and move on.
                        Some(bad) => {
                            self.partial.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[bad..];
                        }
                    }
                }
            }
        }
        self.carry = rest.to_vec();

        let mut lines = Vec::new();
        while let Some(pos) = self.partial.find('\n') {
            let mut line: String = self.partial.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Drain whatever remains after the last chunk.
    ///
    /// A held-back incomplete character can no longer be completed at this
    /// point, so it decodes to U+FFFD.
    pub fn flush(&mut self) -> Option<String> {
        if !self.carry.is_empty() {
            let tail = std::mem::take(&mut self.carry);
            self.partial.push_str(&String::from_utf8_lossy(&tail));
        }
        if self.partial.is_empty() {
            return None;
        }
        let mut line = std::mem::take(&mut self.partial);
        if line.ends_with('\r') {
            line.pop();
        }
        Some(line)
    }
}
