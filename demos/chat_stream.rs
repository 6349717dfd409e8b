//! Streams a chat completion to stdout as it is generated.
//!
//! Usage:
//! `cargo run --example chat_stream -- "Explain backpressure in one paragraph"`

use std::env;
use std::io::Write;

use futures_util::StreamExt;
use xeno::{ChatCompletionOptions, ChatMessage, XenoClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let client = XenoClient::new(None)?;
    let question = env::args()
        .nth(1)
        .unwrap_or_else(|| "Write a haiku about Rust.".to_string());

    let options = ChatCompletionOptions::new(vec![
        ChatMessage::system("You are a concise assistant."),
        ChatMessage::user(question),
    ])
    .with_max_tokens(400);

    let mut stream = client.chat().create_stream(options).await?;
    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        if let Some(content) = chunk?.content() {
            print!("{}", content);
            stdout.flush()?;
        }
    }
    println!();

    Ok(())
}
