//! Incremental byte-to-line decoding for the chat stream body.
//!
//! Network reads arrive with no regard for line or character boundaries. The
//! decoder keeps two pieces of carry-over state between reads: raw bytes that do
//! not yet form a complete UTF-8 sequence, and the text after the last newline.

use log::debug;

const BOM: char = '\u{feff}';

#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
    buffer: String,
    started: bool,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw chunk and returns every line it completed, without the
    /// trailing `\n`.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let scanned = self.buffer.len();
        self.decode_pending();

        // carried-over text has no newline in it, only the new text needs a look
        let Some(last_newline) = self.buffer[scanned..].rfind('\n').map(|i| scanned + i) else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);
        complete[..last_newline].split('\n').map(str::to_string).collect()
    }

    /// Ends the stream. Whatever is still buffered is dropped, not emitted.
    pub fn finish(self) {
        if !self.buffer.is_empty() || !self.pending.is_empty() {
            debug!(
                "Discarding {} buffered chars and {} undecoded bytes at end of stream",
                self.buffer.chars().count(),
                self.pending.len()
            );
        }
    }

    fn decode_pending(&mut self) {
        let mut decoded = String::new();
        let mut consumed = 0;
        loop {
            let rest = &self.pending[consumed..];
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    decoded.push_str(text);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // valid_up_to guarantees this prefix is UTF-8
                    if let Ok(text) = std::str::from_utf8(&rest[..valid]) {
                        decoded.push_str(text);
                    }
                    consumed += valid;
                    match e.error_len() {
                        Some(len) => {
                            decoded.push('\u{fffd}');
                            consumed += len;
                        }
                        // truncated sequence at the end: wait for the next chunk
                        None => break,
                    }
                }
            }
        }
        self.pending.drain(..consumed);
        self.push_text(&decoded);
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let text = if self.started {
            text
        } else {
            self.started = true;
            text.strip_prefix(BOM).unwrap_or(text)
        };
        self.buffer.push_str(text);
    }
}
