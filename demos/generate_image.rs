//! Generates an image from a prompt given on the command line.
//!
//! To run this example, you must have the `XENO_API_KEY` environment variable set.
//!
//! Usage:
//! `cargo run --example generate_image -- "a lighthouse in a storm"`

use std::env;

use xeno::{ImageGenerateOptions, XenoClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let client = XenoClient::new(None)?;

    let prompt = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Please provide a prompt as a command-line argument."))?;

    let image = client
        .images()
        .generate(ImageGenerateOptions::new(prompt).with_size(1024, 768))
        .await?;

    println!("Generated {} image(s) with {}:", image.data.len(), image.model);
    for data in &image.data {
        if let Some(url) = &data.url {
            println!("- {}", url);
        }
    }

    Ok(())
}
