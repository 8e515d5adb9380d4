//! Events and state snapshots produced by a streaming session.

use serde::{Deserialize, Serialize};

/// Highest fraction reported while a download is still in progress.
///
/// Only an explicit success frame moves the bar to [`PROGRESS_DONE`].
pub const PROGRESS_CAP: f64 = 99.0;

/// Fraction reported once the server confirms a download.
pub const PROGRESS_DONE: f64 = 100.0;

/// One meaningful step of a streamed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Incremental text from a generate or chat stream.
    TokenDelta {
        /// The fragment, exactly as sent.
        text: String,
    },
    /// Download progress from a pull stream.
    ProgressUpdate {
        /// Bytes completed, when the frame reported it.
        completed: Option<u64>,
        /// Total bytes, when the frame reported it.
        total: Option<u64>,
        /// Percentage in `0..=100`.
        fraction: f64,
    },
    /// Raw status text (model build log, or a non-numeric pull status).
    LogLine {
        /// The `status` field of the frame.
        text: String,
    },
    /// The session finished successfully. Emitted at most once.
    Complete {
        /// Full accumulated text for generate and chat; `None` otherwise.
        final_text: Option<String>,
    },
    /// One line could not be decoded. The session continues.
    DecodeError {
        /// The offending line.
        raw_line: String,
        /// Human-readable cause.
        cause: String,
    },
    /// The byte stream failed or ended early. Terminal.
    TransportError {
        /// Human-readable cause.
        cause: String,
    },
    /// The server reported an error inside the stream. Terminal.
    ServerError {
        /// The server's `error` message.
        message: String,
    },
}

impl DomainEvent {
    /// Whether no further events may follow this one.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete { .. } | Self::TransportError { .. } | Self::ServerError { .. }
        )
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Still reading.
    Active,
    /// Ended with [`DomainEvent::Complete`].
    Completed,
    /// Ended with a transport or server error.
    Failed,
    /// Stopped by the caller.
    Cancelled,
}

impl SessionStatus {
    /// Whether the session has ended.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Last known download counters. Absent values stay absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Bytes completed.
    pub completed: Option<u64>,
    /// Total bytes.
    pub total: Option<u64>,
}

impl Progress {
    /// In-progress percentage, capped at [`PROGRESS_CAP`].
    ///
    /// `None` unless both counters are known and `total` is non-zero.
    #[must_use]
    pub fn fraction(&self) -> Option<f64> {
        match (self.completed, self.total) {
            (Some(completed), Some(total)) if total > 0 => {
                let pct = completed as f64 / total as f64 * 100.0;
                Some(pct.min(PROGRESS_CAP))
            }
            _ => None,
        }
    }
}
