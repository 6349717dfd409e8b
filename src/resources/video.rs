use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::jobs::JobEndpoint;
use super::{to_body, ExtraFields};
use crate::client::XenoClient;
use crate::error::Result;
use crate::types::VideoResponse;

const GENERATIONS_PATH: &str = "/video/generations";
const DEFAULT_MODEL: &str = "veo-3.1";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Output resolution of a generated video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[default]
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "4k")]
    K4,
}

/// Options for [`Video::generate`].
#[derive(Debug, Clone)]
pub struct VideoGenerateOptions {
    pub prompt: String,
    pub model: String,
    /// A starting frame, as a URL or data URI.
    pub image: Option<String>,
    /// Clip length in seconds.
    pub duration: u32,
    pub resolution: Resolution,
    pub fps: u32,
    /// For example `16:9`.
    pub aspect_ratio: Option<String>,
    pub seed: Option<i64>,
    /// Poll until the job finishes before returning.
    pub wait: bool,
    pub poll_interval: Duration,
    pub extra: ExtraFields,
}

impl VideoGenerateOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: DEFAULT_MODEL.to_string(),
            image: None,
            duration: 5,
            resolution: Resolution::default(),
            fps: 24,
            aspect_ratio: None,
            seed: None,
            wait: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            extra: ExtraFields::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether [`Video::generate`] should wait for the job to finish.
    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[derive(Serialize)]
struct GeneratePayload<'a> {
    #[serde(flatten)]
    extra: &'a ExtraFields,
    model: &'a str,
    prompt: &'a str,
    duration: u32,
    resolution: Resolution,
    fps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
}

impl<'a> From<&'a VideoGenerateOptions> for GeneratePayload<'a> {
    fn from(options: &'a VideoGenerateOptions) -> Self {
        Self {
            extra: &options.extra,
            model: &options.model,
            prompt: &options.prompt,
            duration: options.duration,
            resolution: options.resolution,
            fps: options.fps,
            image: options.image.as_deref().filter(|i| !i.is_empty()),
            aspect_ratio: options.aspect_ratio.as_deref().filter(|a| !a.is_empty()),
            seed: options.seed,
        }
    }
}

/// Video generation jobs.
pub struct Video<'c> {
    jobs: JobEndpoint<'c>,
}

impl<'c> Video<'c> {
    pub(crate) fn new(client: &'c XenoClient) -> Self {
        Self {
            jobs: JobEndpoint::new(client, GENERATIONS_PATH),
        }
    }

    /// Submits a video generation job.
    ///
    /// Unless `wait` is disabled, this polls the job every `poll_interval`
    /// until it completes or fails, and returns the final state. Polling has
    /// no deadline of its own; wrap the call in [`tokio::time::timeout`] to
    /// bound it.
    pub async fn generate(&self, options: VideoGenerateOptions) -> Result<VideoResponse> {
        let body = to_body(&GeneratePayload::from(&options))?;
        let wait = options.wait.then_some(options.poll_interval);
        self.jobs.submit(body, &options.model, wait).await
    }

    /// Retrieves the current state of a video job.
    pub async fn get(&self, id: &str) -> Result<VideoResponse> {
        self.jobs.get(id).await
    }

    /// Polls a video job until it completes or fails.
    pub async fn wait(&self, id: &str, poll_interval: Duration) -> Result<VideoResponse> {
        self.jobs.wait(id, poll_interval).await
    }
}
