//! Ollama API client struct and builder.

use ollama_stream::{CancellationToken, Protocol, StreamHandle, consume};
use serde::Serialize;

use crate::config::ClientConfig;
use crate::conversation::{Conversation, Role};
use crate::error::{ClientError, map_http_status, map_reqwest_error};
use crate::types::{
    ChatBody, CreateBody, CreateRequest, DeleteBody, GenerateBody, GenerateRequest, ModelSummary,
    PullBody, TagsResponse,
};

/// Client for a local Ollama server.
///
/// Streaming methods check their inputs, send the request, and return a
/// [`StreamHandle`] once the server has answered with a success status.
/// Everything after that arrives as [`DomainEvent`](ollama_stream::DomainEvent)s.
///
/// # Example
///
/// ```no_run
/// use ollama_client::Ollama;
///
/// let client = Ollama::new()
///     .base_url("http://localhost:11434")
///     .keep_alive("5m");
/// ```
#[derive(Debug, Clone)]
pub struct Ollama {
    pub(crate) config: ClientConfig,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl Ollama {
    /// Create a client with default settings.
    ///
    /// Default base URL: `http://localhost:11434`.
    /// No authentication required (Ollama is local).
    ///
    /// [`ClientConfig::default`] sets no client options, so the plain
    /// reqwest client applies it exactly.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let client = http_client(&config)?;
        Ok(Self { config, client })
    }

    /// Create a client configured from `OLLAMA_HOST`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server or a remote Ollama instance.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the keep_alive duration for model memory residency.
    ///
    /// Examples: `"5m"` (keep for 5 minutes), `"0"` (unload immediately after request).
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.config.keep_alive = Some(duration.into());
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Stream a completion for a single prompt.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<StreamHandle, ClientError> {
        require(&request.model, "no model selected")?;
        require(&request.prompt, "prompt is empty")?;

        let body = GenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            stream: true,
            keep_alive: self.config.keep_alive.as_deref(),
        };
        self.open_stream(Protocol::Generate, &request.model, &body)
            .await
    }

    /// Stream the assistant's next reply to `conversation`.
    ///
    /// The whole transcript is sent; its last message must be a non-empty
    /// user message.
    pub async fn chat(
        &self,
        model: &str,
        conversation: &Conversation,
    ) -> Result<StreamHandle, ClientError> {
        require(model, "no model selected")?;
        match conversation.last() {
            Some(last) if last.role == Role::User && !last.content.trim().is_empty() => {}
            _ => {
                return Err(ClientError::Precondition(
                    "conversation must end with a non-empty user message".into(),
                ));
            }
        }

        let body = ChatBody {
            model,
            messages: conversation.messages(),
            stream: true,
            keep_alive: self.config.keep_alive.as_deref(),
        };
        self.open_stream(Protocol::Chat, model, &body).await
    }

    /// Download `model` and stream its progress.
    pub async fn pull(&self, model: &str) -> Result<StreamHandle, ClientError> {
        require(model, "no model selected")?;
        let body = PullBody {
            name: model,
            stream: true,
        };
        self.open_stream(Protocol::Pull, model, &body).await
    }

    /// Build a new model and stream the build log.
    pub async fn create(&self, request: &CreateRequest) -> Result<StreamHandle, ClientError> {
        require(&request.name, "model name is empty")?;
        require(&request.from, "no base model selected")?;
        require(&request.system, "system prompt is empty")?;

        let body = CreateBody {
            name: &request.name,
            modelfile: request.modelfile(),
            stream: true,
        };
        self.open_stream(Protocol::Create, &request.name, &body)
            .await
    }

    /// List locally installed models.
    pub async fn list_models(&self) -> Result<Vec<ModelSummary>, ClientError> {
        let url = self.url("/api/tags");
        tracing::debug!(url = %url, "listing Ollama models");

        let response = self.client.get(&url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(map_http_status(status, &text));
        }

        let tags: TagsResponse = serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid tags JSON: {e}")))?;
        Ok(tags.models)
    }

    /// Delete an installed model.
    pub async fn delete_model(&self, model: &str) -> Result<(), ClientError> {
        require(model, "no model selected")?;
        let url = self.url("/api/delete");
        tracing::debug!(url = %url, model = %model, "deleting Ollama model");

        let response = self
            .client
            .delete(&url)
            .json(&DeleteBody { name: model })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.map_err(map_reqwest_error)?;
            return Err(map_http_status(status, &text));
        }
        Ok(())
    }

    async fn open_stream(
        &self,
        protocol: Protocol,
        model: &str,
        body: &impl Serialize,
    ) -> Result<StreamHandle, ClientError> {
        let url = self.url(protocol.endpoint());
        tracing::debug!(
            url = %url,
            model = %model,
            %protocol,
            "sending streaming request to Ollama"
        );

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.map_err(map_reqwest_error)?;
            return Err(map_http_status(status, &text));
        }

        Ok(consume(
            protocol,
            response.bytes_stream(),
            CancellationToken::new(),
        ))
    }
}

impl Default for Ollama {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `config` needs anything beyond a default reqwest client.
fn has_client_options(config: &ClientConfig) -> bool {
    config.request_timeout.is_some() || config.connect_timeout.is_some()
}

fn http_client(config: &ClientConfig) -> Result<reqwest::Client, ClientError> {
    if !has_client_options(config) {
        return Ok(reqwest::Client::new());
    }
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(timeout) = config.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ClientError::InvalidConfig(format!("http client: {e}")))
}

fn require(value: &str, what: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        Err(ClientError::Precondition(what.to_string()))
    } else {
        Ok(())
    }
}
