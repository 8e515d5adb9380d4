//! Download a model and print its progress.
//!
//! Make sure Ollama is running locally and run:
//!   cargo run --example pull -- llama3.2:1b
//!
//! Ctrl-C cancels the download.

use futures::StreamExt;
use ollama_client::{DomainEvent, Ollama, SessionStatus, catalog};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let tag = std::env::args().nth(1).unwrap_or_else(|| "llama3.2:1b".into());
    if let Some(entry) = catalog::find(&tag) {
        println!("Pulling {}", entry.label);
    }

    let client = Ollama::from_env()?;
    let mut stream = client.pull(&tag).await?;
    let cancel = stream.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    while let Some(event) = stream.next().await {
        match event {
            DomainEvent::ProgressUpdate { fraction, .. } => println!("{fraction:>6.2}%"),
            DomainEvent::LogLine { text } => println!("{text}"),
            DomainEvent::ServerError { message } => eprintln!("error: {message}"),
            DomainEvent::TransportError { cause } => eprintln!("connection lost: {cause}"),
            _ => {}
        }
    }

    match stream.status() {
        SessionStatus::Completed => println!("done"),
        SessionStatus::Cancelled => println!("cancelled"),
        status => println!("finished: {status:?}"),
    }
    Ok(())
}
