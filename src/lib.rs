//! An async Rust SDK for the Xeno multi-model AI API.
//!
//! This SDK provides a typed, asynchronous interface to the Xeno platform for
//! generating images, video and music, running chat completions and listing
//! the available models. It handles authentication, timeouts, retries of
//! transient failures and error classification, so callers only deal with
//! typed options and responses.
//!
//! ## Features
//! - Image generation, editing and variations.
//! - Video and music generation jobs, with polling until completion.
//! - Chat completions, whole or streamed as server-sent events.
//! - Typed errors distinguishing authentication, rate limit, invalid request
//!   and insufficient credit failures.
//!
//! ## Quick start
//!
//! ```no_run
//! use xeno::{ImageGenerateOptions, XenoClient};
//!
//! #[tokio::main]
//! async fn main() -> xeno::Result<()> {
//!     // Reads XENO_API_KEY when no key is passed.
//!     let client = XenoClient::new(None)?;
//!
//!     let image = client
//!         .images()
//!         .generate(ImageGenerateOptions::new("A futuristic cityscape at sunset"))
//!         .await?;
//!     println!("{:?}", image.data[0].url);
//!     Ok(())
//! }
//! ```
//!
//! ## Error handling
//!
//! ```no_run
//! # use xeno::{XenoClient, XenoError};
//! # async fn example(client: XenoClient) {
//! match client.models().list().await {
//!     Ok(models) => println!("{} models", models.data.len()),
//!     Err(XenoError::RateLimit { retry_after, .. }) => {
//!         eprintln!("Rate limited, retry after {:?} seconds", retry_after);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # }
//! ```

mod client;
mod config;
mod error;
mod polling;
mod resources;
pub mod sse;
mod types;

pub use client::{EventStream, XenoClient};
pub use config::{
    ClientBuilder, ClientConfig, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES,
    DEFAULT_TIMEOUT,
};
pub use error::{Result, XenoError};
pub use polling::poll_until_terminal;
pub use resources::{
    Chat, ChatCompletionOptions, ChatCompletionStream, ExtraFields, ImageEditOptions,
    ImageGenerateOptions, ImageResponseFormat, ImageVariationOptions, Images, Models, Music,
    MusicGenerateOptions, NamedFunction, Resolution, ResponseFormat, Stop, ToolChoice, Video,
    VideoGenerateOptions,
};
pub use types::{
    ChatCompletion, ChatCompletionChunk, ChatMessage, Choice, DeltaMessage, FunctionCall,
    FunctionCallDelta, FunctionDefinition, Generation, ImageData, ImageResponse, JobStatus, Model,
    ModelList, MusicData, MusicResponse, Role, StreamChoice, Tool, ToolCall, ToolCallDelta, Usage,
    VideoData, VideoResponse,
};
