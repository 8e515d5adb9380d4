#![deny(missing_docs)]
//! Streaming client for a local [Ollama](https://ollama.com) server.
//!
//! # Usage
//!
//! ```no_run
//! use futures::StreamExt;
//! use ollama_client::{Conversation, DomainEvent, Ollama};
//!
//! # async fn run() -> Result<(), ollama_client::ClientError> {
//! let client = Ollama::from_env()?;
//! let mut conversation = Conversation::new();
//! conversation.push_user("Why is the sky blue?");
//!
//! let mut stream = client.chat("llama3.2", &conversation).await?;
//! while let Some(event) = stream.next().await {
//!     match &event {
//!         DomainEvent::TokenDelta { text } => print!("{text}"),
//!         DomainEvent::TransportError { cause } => eprintln!("\n{cause}"),
//!         _ => {}
//!     }
//!     conversation.record_reply(&event);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - Streaming `generate`, `chat`, `pull` and `create` over NDJSON, decoded
//!   by [`ollama_stream`]
//! - Input checks before any request is sent ([`ClientError::Precondition`])
//! - `list_models` and `delete_model` for model management
//! - Configuration from `OLLAMA_HOST`
//! - Error mapping from HTTP status codes to [`ClientError`] variants

pub mod catalog;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod types;

pub use client::Ollama;
pub use config::ClientConfig;
pub use conversation::{ChatMessage, Conversation, Role};
pub use error::ClientError;
pub use types::{CreateRequest, GenerateRequest, ModelSummary};

// Re-export the stream types for convenience
pub use ollama_stream::{
    CancellationToken, DomainEvent, Progress, Protocol, SessionStatus, StreamHandle,
};
