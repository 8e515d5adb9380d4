#![deny(missing_docs)]
//! NDJSON stream consumer for Ollama's streaming endpoints.
//!
//! Ollama answers `/api/generate`, `/api/chat`, `/api/pull` and `/api/create`
//! with newline-delimited JSON, one object per line. Network chunks split
//! those lines (and the UTF-8 characters inside them) at arbitrary points.
//! This crate turns the raw body into an ordered sequence of
//! [`DomainEvent`]s:
//!
//! ```text
//! bytes ─▶ ByteDecoder ─▶ LineFramer ─▶ parse_frame ─▶ adapt(Protocol) ─▶ DomainEvent
//! ```
//!
//! [`StreamSession`] is the synchronous, push-driven pipeline for one
//! request. [`consume`] wraps it around any `Stream<Item = Result<Bytes, E>>`
//! (for example `reqwest::Response::bytes_stream()`) and hands back a
//! [`StreamHandle`] with cancellation and a status query.
//!
//! # Example
//!
//! ```
//! use ollama_stream::{DomainEvent, Protocol, StreamSession};
//!
//! let mut session = StreamSession::new(Protocol::Generate);
//! let mut events = session.feed(br#"{"response":"Hi","done":false}"#);
//! assert!(events.is_empty());
//! events.extend(session.feed(b"\n"));
//! assert_eq!(events, vec![DomainEvent::TokenDelta { text: "Hi".into() }]);
//! ```

pub mod consumer;
pub mod decode;
pub mod error;
pub mod event;
pub mod frame;
pub mod framer;
pub mod protocol;
pub mod session;

pub use consumer::{StreamHandle, consume};
pub use decode::ByteDecoder;
pub use error::FrameError;
pub use event::{DomainEvent, PROGRESS_CAP, PROGRESS_DONE, Progress, SessionStatus};
pub use frame::{JsonObject, parse_frame};
pub use framer::LineFramer;
pub use protocol::{Accumulator, Protocol, adapt};
pub use session::{EARLY_EOF_CAUSE, StreamSession};

// Re-exported so callers can build tokens without a direct tokio-util dependency.
pub use tokio_util::sync::CancellationToken;
