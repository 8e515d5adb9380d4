//! Per-endpoint interpretation of parsed frames.
//!
//! Each Ollama streaming endpoint emits a different object shape:
//!
//! ```text
//! generate  {"model":"llama3.2","response":"Hel","done":false}
//! chat      {"model":"llama3.2","message":{"role":"assistant","content":"Hel"},"done":false}
//! pull      {"status":"pulling 6a0746a1ec1a","digest":"sha256:…","total":2019377376,"completed":241970}
//! create    {"status":"reading model metadata"}
//! ```
//!
//! Extra keys are always ignored. A frame lacking the field its endpoint
//! depends on is reported as [`FrameError::UnrecognizedShape`].
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md>

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FrameError;
use crate::event::{DomainEvent, PROGRESS_DONE, Progress};
use crate::frame::JsonObject;

/// Status prefix of pull frames that may carry byte counters.
const PULLING_PREFIX: &str = "pulling";

/// Status of the terminal frame of pull and create streams.
const SUCCESS_STATUS: &str = "success";

/// The upstream endpoint a session is reading from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// `POST /api/generate`
    Generate,
    /// `POST /api/chat`
    Chat,
    /// `POST /api/pull`
    Pull,
    /// `POST /api/create`
    Create,
}

impl Protocol {
    /// Path of the endpoint, relative to the server base URL.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Generate => "/api/generate",
            Self::Chat => "/api/chat",
            Self::Pull => "/api/pull",
            Self::Create => "/api/create",
        }
    }

    /// Whether the transport closing without a terminal frame counts as
    /// success.
    ///
    /// Only build logs are open-ended; every other endpoint promises an
    /// explicit final frame.
    #[must_use]
    pub fn completes_on_eof(self) -> bool {
        matches!(self, Self::Create)
    }

    /// Whether this endpoint produces text that is accumulated.
    #[must_use]
    pub fn accumulates_text(self) -> bool {
        matches!(self, Self::Generate | Self::Chat)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generate => "generate",
            Self::Chat => "chat",
            Self::Pull => "pull",
            Self::Create => "create",
        })
    }
}

/// Running result of one session, owned by the session.
#[derive(Debug, Default)]
pub struct Accumulator {
    text: String,
    progress: Progress,
}

impl Accumulator {
    /// Text accumulated so far (generate and chat).
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last known download counters (pull).
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }
}

#[derive(Deserialize)]
struct GenerateFrame {
    response: String,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct ChatFrame {
    message: ChatDelta,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct ChatDelta {
    content: String,
}

#[derive(Deserialize)]
struct StatusFrame {
    status: String,
    #[serde(default)]
    completed: Option<u64>,
    #[serde(default)]
    total: Option<u64>,
}

/// Interpret one parsed frame for `protocol`, updating `acc`.
///
/// Usually returns one event; a terminal frame may return two (the last
/// delta or progress value, then the terminal event). A frame with a string
/// `error` key yields a single [`DomainEvent::ServerError`] regardless of
/// protocol.
pub fn adapt(
    protocol: Protocol,
    frame: JsonObject,
    acc: &mut Accumulator,
) -> Result<Vec<DomainEvent>, FrameError> {
    if let Some(Value::String(message)) = frame.get("error") {
        return Ok(vec![DomainEvent::ServerError {
            message: message.clone(),
        }]);
    }

    match protocol {
        Protocol::Generate => {
            let f: GenerateFrame = shape(protocol, frame)?;
            Ok(text_events(acc, f.response, f.done))
        }
        Protocol::Chat => {
            let f: ChatFrame = shape(protocol, frame)?;
            Ok(text_events(acc, f.message.content, f.done))
        }
        Protocol::Pull => {
            let f: StatusFrame = shape(protocol, frame)?;
            Ok(pull_events(acc, f))
        }
        Protocol::Create => {
            let f: StatusFrame = shape(protocol, frame)?;
            let done = f.status == SUCCESS_STATUS;
            let mut events = vec![DomainEvent::LogLine { text: f.status }];
            if done {
                events.push(DomainEvent::Complete { final_text: None });
            }
            Ok(events)
        }
    }
}

fn shape<T: DeserializeOwned>(
    protocol: Protocol,
    frame: JsonObject,
) -> Result<T, FrameError> {
    serde_json::from_value(Value::Object(frame)).map_err(|e| FrameError::UnrecognizedShape {
        protocol,
        reason: e.to_string(),
    })
}

fn text_events(acc: &mut Accumulator, fragment: String, done: bool) -> Vec<DomainEvent> {
    let mut events = Vec::new();
    if !fragment.is_empty() {
        acc.text.push_str(&fragment);
        events.push(DomainEvent::TokenDelta { text: fragment });
    }
    if done {
        events.push(DomainEvent::Complete {
            final_text: Some(acc.text.clone()),
        });
    }
    events
}

fn pull_events(acc: &mut Accumulator, frame: StatusFrame) -> Vec<DomainEvent> {
    if frame.status == SUCCESS_STATUS {
        return vec![
            DomainEvent::ProgressUpdate {
                completed: acc.progress.completed,
                total: acc.progress.total,
                fraction: PROGRESS_DONE,
            },
            DomainEvent::Complete { final_text: None },
        ];
    }

    if frame.status.starts_with(PULLING_PREFIX) {
        let progress = Progress {
            completed: frame.completed,
            total: frame.total,
        };
        if let Some(fraction) = progress.fraction() {
            acc.progress = progress;
            return vec![DomainEvent::ProgressUpdate {
                completed: progress.completed,
                total: progress.total,
                fraction,
            }];
        }
    }

    vec![DomainEvent::LogLine { text: frame.status }]
}
