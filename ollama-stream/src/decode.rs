//! Incremental UTF-8 decoding of response body chunks.
//!
//! HTTP chunk boundaries know nothing about characters, so a multi-byte
//! sequence can arrive split across two reads. [`ByteDecoder`] keeps the
//! undecoded suffix of each chunk and prepends it to the next one.

/// Streaming UTF-8 decoder for one session.
///
/// Invalid sequences are replaced with [`char::REPLACEMENT_CHARACTER`]
/// instead of failing the stream. The line that contains the substitution is
/// left for the frame parser to reject.
#[derive(Debug, Default)]
pub struct ByteDecoder {
    /// Bytes of an incomplete trailing sequence from the previous chunk.
    pending: Vec<u8>,
    /// Number of invalid sequences replaced so far.
    substitutions: usize,
}

impl ByteDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, returning all text that is complete so far.
    ///
    /// A trailing incomplete sequence is held back and never reported as an
    /// error; it is completed (or replaced) by a later call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::with_capacity(self.pending.len());
        let mut pos = 0;
        loop {
            let rest = &self.pending[pos..];
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    pos = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            tracing::warn!(
                                offset = pos + valid,
                                len = bad,
                                "invalid UTF-8 in stream, substituting replacement character"
                            );
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.substitutions += 1;
                            pos += valid + bad;
                        }
                        None => {
                            pos += valid;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..pos);
        out
    }

    /// Flush at end of stream.
    ///
    /// A sequence that never completed is replaced by a single replacement
    /// character. Returns an empty string when nothing was pending.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        tracing::debug!(
            bytes = self.pending.len(),
            "stream ended inside a multi-byte sequence"
        );
        self.pending.clear();
        self.substitutions += 1;
        char::REPLACEMENT_CHARACTER.to_string()
    }

    /// Number of bytes currently held back.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of invalid sequences that were substituted.
    #[must_use]
    pub fn substitutions(&self) -> usize {
        self.substitutions
    }
}
