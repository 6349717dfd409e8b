use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::jobs::JobEndpoint;
use super::{to_body, ExtraFields};
use crate::client::XenoClient;
use crate::error::Result;
use crate::types::MusicResponse;

const GENERATIONS_PATH: &str = "/music/generations";
const DEFAULT_MODEL: &str = "suno-v4";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Options for [`Music::generate`].
#[derive(Debug, Clone)]
pub struct MusicGenerateOptions {
    pub prompt: String,
    pub model: String,
    /// Track length in seconds.
    pub duration: u32,
    pub genre: Option<String>,
    pub mood: Option<String>,
    /// Beats per minute.
    pub tempo: Option<u32>,
    pub lyrics: Option<String>,
    pub instrumental: bool,
    pub seed: Option<i64>,
    /// Poll until the job finishes before returning.
    pub wait: bool,
    pub poll_interval: Duration,
    pub extra: ExtraFields,
}

impl MusicGenerateOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: DEFAULT_MODEL.to_string(),
            duration: 120,
            genre: None,
            mood: None,
            tempo: None,
            lyrics: None,
            instrumental: false,
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

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_tempo(mut self, bpm: u32) -> Self {
        self.tempo = Some(bpm);
        self
    }

    pub fn with_lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = Some(lyrics.into());
        self
    }

    pub fn with_instrumental(mut self, instrumental: bool) -> Self {
        self.instrumental = instrumental;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

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
    instrumental: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    genre: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mood: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tempo: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lyrics: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
}

impl<'a> From<&'a MusicGenerateOptions> for GeneratePayload<'a> {
    fn from(options: &'a MusicGenerateOptions) -> Self {
        Self {
            extra: &options.extra,
            model: &options.model,
            prompt: &options.prompt,
            duration: options.duration,
            instrumental: options.instrumental,
            genre: options.genre.as_deref().filter(|g| !g.is_empty()),
            mood: options.mood.as_deref().filter(|m| !m.is_empty()),
            tempo: options.tempo.filter(|t| *t > 0),
            lyrics: options.lyrics.as_deref().filter(|l| !l.is_empty()),
            seed: options.seed,
        }
    }
}

/// Music generation jobs.
pub struct Music<'c> {
    jobs: JobEndpoint<'c>,
}

impl<'c> Music<'c> {
    pub(crate) fn new(client: &'c XenoClient) -> Self {
        Self {
            jobs: JobEndpoint::new(client, GENERATIONS_PATH),
        }
    }

    /// Submits a music generation job, waiting for it unless `wait` is disabled.
    pub async fn generate(&self, options: MusicGenerateOptions) -> Result<MusicResponse> {
        let body = to_body(&GeneratePayload::from(&options))?;
        let wait = options.wait.then_some(options.poll_interval);
        self.jobs.submit(body, &options.model, wait).await
    }

    pub async fn get(&self, id: &str) -> Result<MusicResponse> {
        self.jobs.get(id).await
    }

    pub async fn wait(&self, id: &str, poll_interval: Duration) -> Result<MusicResponse> {
        self.jobs.wait(id, poll_interval).await
    }
}
