//! Newline framing over decoded text.

/// Splits decoded text into `\n`-terminated lines for one session.
///
/// Text after the last delimiter stays buffered until more input arrives.
/// Scanning resumes where the previous scan stopped, so a long partial line
/// delivered in many small pieces is not rescanned from the start each time.
///
/// # Truncation tolerance
///
/// Ollama terminates every frame with `\n`. If the transport ends while a
/// remainder is still buffered, [`LineFramer::take_remainder`] hands it back
/// for logging and it is discarded rather than parsed. This is policy, not an
/// error.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: String,
    /// Start of the first unconsumed line in `buf`.
    start: usize,
    /// Position from which the next delimiter search begins.
    scan: usize,
}

impl LineFramer {
    /// Create an empty framer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append decoded text.
    pub fn push(&mut self, text: &str) {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.scan -= self.start;
            self.start = 0;
        }
        self.buf.push_str(text);
    }

    /// Take the next complete line, without its delimiter.
    ///
    /// A trailing `\r` is stripped so CRLF bodies frame the same way.
    pub fn next_line(&mut self) -> Option<String> {
        match self.buf[self.scan..].find('\n') {
            Some(rel) => {
                let end = self.scan + rel;
                let line = self.buf[self.start..end]
                    .trim_end_matches('\r')
                    .to_string();
                self.start = end + 1;
                self.scan = self.start;
                Some(line)
            }
            None => {
                self.scan = self.buf.len();
                None
            }
        }
    }

    /// Lazily yield every complete line currently buffered.
    pub fn drain(&mut self) -> impl Iterator<Item = String> + '_ {
        std::iter::from_fn(move || self.next_line())
    }

    /// Bytes of buffered text not yet returned as a line.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buf.len() - self.start
    }

    /// Clear the buffer at end of stream, returning any unterminated
    /// remainder that is being discarded.
    pub fn take_remainder(&mut self) -> Option<String> {
        let rest = self.buf.split_off(self.start);
        self.buf.clear();
        self.start = 0;
        self.scan = 0;
        if rest.is_empty() { None } else { Some(rest) }
    }
}
