//! Request and response types for the Ollama HTTP API.
//!
//! Public types describe what the caller asks for; the `*Body` structs are
//! the exact JSON written on the wire.

use serde::{Deserialize, Serialize};

use crate::conversation::ChatMessage;

/// A one-shot completion request for `/api/generate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Model tag (e.g. `"llama3.2"`).
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// Optional system prompt overriding the model's own.
    pub system: Option<String>,
}

impl GenerateRequest {
    /// Request `prompt` from `model`.
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
        }
    }

    /// Set a system prompt.
    #[must_use]
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// A request to derive a new model from an installed one via `/api/create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    /// Name of the model to create.
    pub name: String,
    /// Installed model to build from.
    pub from: String,
    /// System prompt baked into the new model.
    pub system: String,
}

impl CreateRequest {
    /// Build `name` from `from` with `system` as its system prompt.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        from: impl Into<String>,
        system: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            system: system.into(),
        }
    }

    /// The Modelfile sent to the server.
    #[must_use]
    pub fn modelfile(&self) -> String {
        format!("FROM {}\nSYSTEM {}", self.from, self.system)
    }
}

/// A locally installed model, as listed by `/api/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelSummary {
    /// Display name (e.g. `"llama3.2:latest"`).
    pub name: String,
    /// Model tag to use in requests.
    pub model: String,
    /// Size on disk in bytes.
    #[serde(default)]
    pub size: u64,
    /// Content digest.
    #[serde(default)]
    pub digest: Option<String>,
    /// Last modification time, as reported by the server.
    #[serde(default)]
    pub modified_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateBody<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatBody<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PullBody<'a> {
    pub name: &'a str,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateBody<'a> {
    pub name: &'a str,
    pub modelfile: String,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteBody<'a> {
    pub name: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modelfile_format() {
        let req = CreateRequest::new("pirate", "llama3.2", "Talk like a pirate.");
        assert_eq!(req.modelfile(), "FROM llama3.2\nSYSTEM Talk like a pirate.");
    }

    #[test]
    fn generate_body_omits_unset_fields() {
        let body = GenerateBody {
            model: "llama3.2",
            prompt: "hi",
            system: None,
            stream: true,
            keep_alive: None,
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            serde_json::json!({"model": "llama3.2", "prompt": "hi", "stream": true})
        );
    }

    #[test]
    fn chat_body_serializes_roles() {
        let messages = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let body = ChatBody {
            model: "llama3.2",
            messages: &messages,
            stream: true,
            keep_alive: Some("5m"),
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            serde_json::json!({
                "model": "llama3.2",
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ],
                "stream": true,
                "keep_alive": "5m"
            })
        );
    }

    #[test]
    fn tags_response_tolerates_extra_fields() {
        let json = r#"{"models":[{
            "name": "llama3.2:latest",
            "model": "llama3.2:latest",
            "size": 2019393189,
            "digest": "a80c4f17",
            "details": {"family": "llama"}
        }]}"#;
        let tags: TagsResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(tags.models.len(), 1);
        assert_eq!(tags.models[0].model, "llama3.2:latest");
        assert_eq!(tags.models[0].size, 2_019_393_189);
        assert!(tags.models[0].modified_at.is_none());
    }
}
