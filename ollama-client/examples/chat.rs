//! Interactive chat against a local Ollama server.
//!
//! Make sure Ollama is running locally and run:
//!   cargo run --example chat -- llama3.2
//!
//! Set `RUST_LOG=ollama_stream=debug` to see session summaries.

use std::io::{BufRead, Write};

use futures::StreamExt;
use ollama_client::{Conversation, DomainEvent, Ollama};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model = std::env::args().nth(1).unwrap_or_else(|| "llama3.2".into());
    let client = Ollama::from_env()?;
    let mut conversation = Conversation::new();

    let stdin = std::io::stdin();
    print!("> ");
    std::io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            print!("> ");
            std::io::stdout().flush()?;
            continue;
        }
        conversation.push_user(line);

        let mut stream = client.chat(&model, &conversation).await?;
        while let Some(event) = stream.next().await {
            match &event {
                DomainEvent::TokenDelta { text } => {
                    print!("{text}");
                    std::io::stdout().flush()?;
                }
                DomainEvent::DecodeError { cause, .. } => eprintln!("\n[skipped line: {cause}]"),
                DomainEvent::TransportError { cause } => eprintln!("\n[connection lost: {cause}]"),
                DomainEvent::ServerError { message } => eprintln!("\n[server: {message}]"),
                _ => {}
            }
            conversation.record_reply(&event);
        }
        print!("\n> ");
        std::io::stdout().flush()?;
    }

    Ok(())
}
