//! The per-request state machine.
//!
//! A [`StreamSession`] owns every piece of mutable state for one streamed
//! response: the byte decoder, the line buffer, the accumulated text and the
//! download counters. It is push-driven and synchronous; the async loop in
//! [`crate::consumer`] only feeds it chunks.

use crate::decode::ByteDecoder;
use crate::event::{DomainEvent, Progress, SessionStatus};
use crate::frame::parse_frame;
use crate::framer::LineFramer;
use crate::protocol::{Accumulator, Protocol, adapt};

/// Cause reported when generate, chat or pull streams close early.
pub const EARLY_EOF_CAUSE: &str = "stream ended before a terminal frame";

/// State of one in-flight request.
#[derive(Debug)]
pub struct StreamSession {
    protocol: Protocol,
    decoder: ByteDecoder,
    framer: LineFramer,
    acc: Accumulator,
    status: SessionStatus,
    decode_errors: usize,
}

impl StreamSession {
    /// Start a session reading `protocol` frames.
    #[must_use]
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            decoder: ByteDecoder::new(),
            framer: LineFramer::new(),
            acc: Accumulator::default(),
            status: SessionStatus::Active,
            decode_errors: 0,
        }
    }

    /// Feed one chunk of the response body.
    ///
    /// Returns the events produced by every line the chunk completed, in
    /// order. Once the session has ended this returns nothing. Lines after a
    /// terminal frame within the same chunk are ignored.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DomainEvent> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        let text = self.decoder.decode(chunk);
        self.framer.push(&text);
        self.process_lines()
    }

    /// The transport reached end of stream.
    ///
    /// Any unterminated remainder is discarded. Create sessions complete;
    /// every other protocol fails with [`EARLY_EOF_CAUSE`].
    pub fn finish(&mut self) -> Vec<DomainEvent> {
        if self.status.is_terminal() {
            return Vec::new();
        }

        let tail = self.decoder.finish();
        self.framer.push(&tail);
        let mut events = self.process_lines();
        if self.status.is_terminal() {
            return events;
        }

        if let Some(rest) = self.framer.take_remainder() {
            tracing::debug!(
                protocol = %self.protocol,
                bytes = rest.len(),
                "discarding unterminated trailing frame"
            );
        }

        let last = if self.protocol.completes_on_eof() {
            DomainEvent::Complete { final_text: None }
        } else {
            DomainEvent::TransportError {
                cause: EARLY_EOF_CAUSE.into(),
            }
        };
        self.settle(&last);
        events.push(last);
        events
    }

    /// The transport failed. Produces a single terminal event.
    pub fn fail(&mut self, cause: impl Into<String>) -> Vec<DomainEvent> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        let event = DomainEvent::TransportError {
            cause: cause.into(),
        };
        self.settle(&event);
        vec![event]
    }

    /// The caller gave up. No events are produced.
    pub fn cancel(&mut self) {
        if !self.status.is_terminal() {
            self.status = SessionStatus::Cancelled;
        }
    }

    /// Protocol this session interprets frames with.
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Text accumulated so far.
    #[must_use]
    pub fn text(&self) -> &str {
        self.acc.text()
    }

    /// Last known download counters.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.acc.progress()
    }

    /// Number of lines rejected so far.
    #[must_use]
    pub fn decode_errors(&self) -> usize {
        self.decode_errors
    }

    fn process_lines(&mut self) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        while let Some(line) = self.framer.next_line() {
            let Some(parsed) = parse_frame(&line) else {
                continue;
            };
            let result = parsed.and_then(|frame| adapt(self.protocol, frame, &mut self.acc));
            match result {
                Ok(produced) => {
                    for event in produced {
                        let terminal = event.is_terminal();
                        if terminal {
                            self.settle(&event);
                        }
                        events.push(event);
                        if terminal {
                            return events;
                        }
                    }
                }
                Err(e) => {
                    self.decode_errors += 1;
                    tracing::warn!(
                        protocol = %self.protocol,
                        error = %e,
                        "skipping undecodable frame"
                    );
                    events.push(DomainEvent::DecodeError {
                        raw_line: line,
                        cause: e.to_string(),
                    });
                }
            }
        }
        events
    }

    fn settle(&mut self, terminal: &DomainEvent) {
        self.status = match terminal {
            DomainEvent::Complete { .. } => SessionStatus::Completed,
            _ => SessionStatus::Failed,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(session: &mut StreamSession, chunks: &[&[u8]]) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(session.feed(chunk));
        }
        events.extend(session.finish());
        events
    }

    #[test]
    fn generate_scenario_across_chunk_boundaries() {
        let mut s = StreamSession::new(Protocol::Generate);
        let events = feed_all(
            &mut s,
            &[
                br#"{"response":"Hel"#,
                b"lo\",\"done\":false}\n{\"respo",
                b"nse\":\" world\",\"done\":true}\n",
            ],
        );
        assert_eq!(
            events,
            vec![
                DomainEvent::TokenDelta { text: "Hello".into() },
                DomainEvent::TokenDelta { text: " world".into() },
                DomainEvent::Complete {
                    final_text: Some("Hello world".into())
                },
            ]
        );
        assert_eq!(s.status(), SessionStatus::Completed);
    }

    #[test]
    fn pull_scenario() {
        let mut s = StreamSession::new(Protocol::Pull);
        let events = feed_all(
            &mut s,
            &[b"{\"status\":\"pulling\",\"completed\":50,\"total\":200}\n{\"status\":\"success\"}\n"],
        );
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            DomainEvent::ProgressUpdate { fraction, .. } if (fraction - 25.0).abs() < 1e-9
        ));
        assert!(matches!(
            events[1],
            DomainEvent::ProgressUpdate { fraction, .. } if fraction == 100.0
        ));
        assert_eq!(events[2], DomainEvent::Complete { final_text: None });
    }

    #[test]
    fn bad_line_between_valid_frames() {
        let mut s = StreamSession::new(Protocol::Generate);
        let events = feed_all(
            &mut s,
            &[b"{\"response\":\"a\"}\nnot json at all\n{\"response\":\"b\",\"done\":true}\n"],
        );
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], DomainEvent::TokenDelta { text: "a".into() });
        assert!(matches!(
            &events[1],
            DomainEvent::DecodeError { raw_line, .. } if raw_line == "not json at all"
        ));
        assert_eq!(events[2], DomainEvent::TokenDelta { text: "b".into() });
        assert_eq!(
            events[3],
            DomainEvent::Complete {
                final_text: Some("ab".into())
            }
        );
        assert_eq!(s.decode_errors(), 1);
    }

    #[test]
    fn chat_eof_without_done_is_transport_error() {
        let mut s = StreamSession::new(Protocol::Chat);
        let events = feed_all(&mut s, &[b"{\"message\":{\"content\":\"hi\"},\"done\":false}\n"]);
        assert_eq!(
            events,
            vec![
                DomainEvent::TokenDelta { text: "hi".into() },
                DomainEvent::TransportError {
                    cause: EARLY_EOF_CAUSE.into()
                },
            ]
        );
        assert_eq!(s.status(), SessionStatus::Failed);
        assert_eq!(s.text(), "hi");
    }

    #[test]
    fn create_eof_is_complete() {
        let mut s = StreamSession::new(Protocol::Create);
        let events = feed_all(
            &mut s,
            &[b"{\"status\":\"reading model metadata\"}\n{\"status\":\"creating system layer\"}\n"],
        );
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], DomainEvent::Complete { final_text: None });
        assert_eq!(s.status(), SessionStatus::Completed);
    }

    #[test]
    fn unterminated_remainder_is_discarded() {
        let mut s = StreamSession::new(Protocol::Create);
        let events = feed_all(&mut s, &[b"{\"status\":\"a\"}\n{\"status\":\"trunc"]);
        assert_eq!(
            events,
            vec![
                DomainEvent::LogLine { text: "a".into() },
                DomainEvent::Complete { final_text: None },
            ]
        );
    }

    #[test]
    fn nothing_after_complete() {
        let mut s = StreamSession::new(Protocol::Generate);
        let events = s.feed(b"{\"response\":\"x\",\"done\":true}\n{\"response\":\"y\"}\n");
        assert_eq!(events.len(), 2);
        assert!(events[1].is_terminal());
        assert!(s.feed(b"{\"response\":\"z\"}\n").is_empty());
        assert!(s.finish().is_empty());
        assert!(s.fail("late").is_empty());
        assert_eq!(s.text(), "x");
    }

    #[test]
    fn fail_is_terminal_and_single() {
        let mut s = StreamSession::new(Protocol::Pull);
        let events = s.fail("connection reset");
        assert_eq!(
            events,
            vec![DomainEvent::TransportError {
                cause: "connection reset".into()
            }]
        );
        assert_eq!(s.status(), SessionStatus::Failed);
        assert!(s.finish().is_empty());
    }

    #[test]
    fn server_error_frame_fails_session() {
        let mut s = StreamSession::new(Protocol::Pull);
        let events = feed_all(
            &mut s,
            &[b"{\"error\":\"pull model manifest: file does not exist\"}\n"],
        );
        assert_eq!(
            events,
            vec![DomainEvent::ServerError {
                message: "pull model manifest: file does not exist".into()
            }]
        );
        assert_eq!(s.status(), SessionStatus::Failed);
    }

    #[test]
    fn cancel_stops_further_events() {
        let mut s = StreamSession::new(Protocol::Chat);
        s.cancel();
        assert_eq!(s.status(), SessionStatus::Cancelled);
        assert!(s.feed(b"{\"message\":{\"content\":\"hi\"}}\n").is_empty());
        assert!(s.finish().is_empty());
    }

    #[test]
    fn invalid_utf8_line_is_isolated() {
        let mut s = StreamSession::new(Protocol::Generate);
        let events = feed_all(
            &mut s,
            &[b"{\"response\":\"ok\"}\n{\"resp\xFFonse\":\"x\"}\n{\"response\":\"!\",\"done\":true}\n"],
        );
        assert_eq!(events.len(), 4);
        assert!(matches!(events[1], DomainEvent::DecodeError { .. }));
        assert_eq!(
            events[3],
            DomainEvent::Complete {
                final_text: Some("ok!".into())
            }
        );
    }

    #[test]
    fn progress_is_tracked() {
        let mut s = StreamSession::new(Protocol::Pull);
        s.feed(b"{\"status\":\"pulling abc\",\"completed\":10,\"total\":40}\n");
        assert_eq!(
            s.progress(),
            Progress {
                completed: Some(10),
                total: Some(40)
            }
        );
        assert_eq!(s.status(), SessionStatus::Active);
    }
}
