//! Submits a video generation job and waits for it to finish, giving up after
//! ten minutes.
//!
//! Usage:
//! `cargo run --example generate_video -- "a timelapse of clouds over mountains"`

use std::env;
use std::time::Duration;

use xeno::{JobStatus, VideoGenerateOptions, XenoClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let client = XenoClient::new(None)?;
    let prompt = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Please provide a prompt as a command-line argument."))?;

    let options = VideoGenerateOptions::new(prompt)
        .with_duration(8)
        .with_aspect_ratio("16:9")
        .with_poll_interval(Duration::from_secs(5));

    let video = match tokio::time::timeout(
        Duration::from_secs(600),
        client.video().generate(options),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            eprintln!("\nGave up waiting for the video.");
            return Ok(());
        }
    };

    match video.status {
        JobStatus::Completed => {
            for clip in video.data.unwrap_or_default() {
                println!("Video ready: {}", clip.url.unwrap_or_default());
            }
        }
        status => {
            println!(
                "Job {} finished with status {:?}: {}",
                video.id,
                status,
                video.error.unwrap_or_default()
            );
        }
    }

    Ok(())
}
