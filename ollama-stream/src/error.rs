//! Frame-level errors.
//!
//! None of these end a session. They are converted into
//! [`DomainEvent::DecodeError`](crate::DomainEvent::DecodeError) and the
//! consumer moves on to the next line.

use crate::protocol::Protocol;

/// Why a single NDJSON line could not be turned into events.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The line is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The line is valid JSON but not an object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The object lacks the fields the active protocol requires.
    #[error("unrecognized {protocol} frame: {reason}")]
    UnrecognizedShape {
        /// Protocol the frame was interpreted against.
        protocol: Protocol,
        /// What was missing or mistyped.
        reason: String,
    },
}
