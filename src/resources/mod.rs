//! Per-domain façades that turn option structs into API requests.
//!
//! Each façade borrows the [`XenoClient`](crate::XenoClient) and holds no
//! state of its own.

mod chat;
mod images;
mod jobs;
mod models;
mod music;
mod video;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

pub use chat::{
    Chat, ChatCompletionOptions, ChatCompletionStream, NamedFunction, ResponseFormat, Stop,
    ToolChoice,
};
pub use images::{
    ImageEditOptions, ImageGenerateOptions, ImageResponseFormat, ImageVariationOptions, Images,
};
pub use models::Models;
pub use music::{Music, MusicGenerateOptions};
pub use video::{Resolution, Video, VideoGenerateOptions};

/// Additional payload fields not modelled by an options struct.
pub type ExtraFields = Map<String, Value>;

fn to_body<T: Serialize>(payload: &T) -> Result<Value> {
    Ok(serde_json::to_value(payload)?)
}

/// The response echoes the model only sometimes; fall back to the requested one.
fn fill_model(model: &mut String, requested: &str) {
    if model.is_empty() {
        *model = requested.to_string();
    }
}
