//! Request-level errors and the mapping from HTTP/reqwest failures.
//!
//! Everything here happens before a stream exists. Once a
//! [`StreamHandle`](ollama_stream::StreamHandle) has been returned, failures
//! arrive as terminal [`DomainEvent`](ollama_stream::DomainEvent)s instead.

/// Errors from issuing a request to the Ollama server.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Required input was missing; no request was sent.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Network-level error (connection refused, reset, DNS failure).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server does not know the requested model.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The server rejected the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The server failed or is overloaded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A non-streaming response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Whether issuing the same request again might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout | Self::ServiceUnavailable(_)
        )
    }
}

/// Map an HTTP status code (from the Ollama API) to a [`ClientError`].
///
/// Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md>
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ClientError {
    let message = error_message(body);
    match status.as_u16() {
        404 => ClientError::ModelNotFound(message),
        400 => ClientError::InvalidRequest(message),
        500..=599 => ClientError::ServiceUnavailable(message),
        _ => ClientError::InvalidRequest(format!("HTTP {status}: {message}")),
    }
}

/// Map a [`reqwest::Error`] to a [`ClientError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Network(Box::new(err))
    }
}

/// Ollama wraps most failures as `{"error": "..."}`; unwrap that when present.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
