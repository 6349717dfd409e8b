use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{fill_model, to_body, ExtraFields};
use crate::client::{RequestSpec, XenoClient};
use crate::error::Result;
use crate::types::ImageResponse;

const DEFAULT_MODEL: &str = "flux-pro-1.1";
const DEFAULT_EDIT_MODEL: &str = "flux-kontext";
const DEFAULT_SIZE: u32 = 1024;

/// How generated images are returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageResponseFormat {
    #[default]
    Url,
    B64Json,
}

/// Options for [`Images::generate`].
#[derive(Debug, Clone)]
pub struct ImageGenerateOptions {
    pub prompt: String,
    pub model: String,
    pub negative_prompt: Option<String>,
    pub width: u32,
    pub height: u32,
    pub steps: Option<u32>,
    pub guidance_scale: Option<f64>,
    pub seed: Option<i64>,
    /// Number of images to generate.
    pub n: u32,
    pub response_format: ImageResponseFormat,
    pub extra: ExtraFields,
}

impl ImageGenerateOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: DEFAULT_MODEL.to_string(),
            negative_prompt: None,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            steps: None,
            guidance_scale: None,
            seed: None,
            n: 1,
            response_format: ImageResponseFormat::default(),
            extra: ExtraFields::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: f64) -> Self {
        self.guidance_scale = Some(guidance_scale);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_n(mut self, n: u32) -> Self {
        self.n = n;
        self
    }

    pub fn with_response_format(mut self, response_format: ImageResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }

    /// Adds a field the API accepts that has no dedicated setter.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Options for [`Images::edit`].
#[derive(Debug, Clone)]
pub struct ImageEditOptions {
    /// The source image, as a URL or data URI.
    pub image: String,
    pub prompt: String,
    pub model: String,
    /// Areas of `image` to repaint, in the same format as `image`.
    pub mask: Option<String>,
    pub n: u32,
    pub extra: ExtraFields,
}

impl ImageEditOptions {
    pub fn new(image: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            prompt: prompt.into(),
            model: DEFAULT_EDIT_MODEL.to_string(),
            mask: None,
            n: 1,
            extra: ExtraFields::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = Some(mask.into());
        self
    }

    pub fn with_n(mut self, n: u32) -> Self {
        self.n = n;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Options for [`Images::variations`].
#[derive(Debug, Clone)]
pub struct ImageVariationOptions {
    pub model: String,
    pub n: u32,
    pub extra: ExtraFields,
}

impl Default for ImageVariationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            n: 1,
            extra: ExtraFields::new(),
        }
    }
}

impl ImageVariationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_n(mut self, n: u32) -> Self {
        self.n = n;
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
    n: u32,
    size: String,
    response_format: ImageResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guidance_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
}

impl<'a> From<&'a ImageGenerateOptions> for GeneratePayload<'a> {
    fn from(options: &'a ImageGenerateOptions) -> Self {
        Self {
            extra: &options.extra,
            model: &options.model,
            prompt: &options.prompt,
            n: options.n,
            size: format!("{}x{}", options.width, options.height),
            response_format: options.response_format,
            // Empty and zero values mean "let the model decide".
            negative_prompt: options.negative_prompt.as_deref().filter(|p| !p.is_empty()),
            steps: options.steps.filter(|s| *s > 0),
            guidance_scale: options.guidance_scale.filter(|g| *g != 0.0),
            seed: options.seed,
        }
    }
}

#[derive(Serialize)]
struct EditPayload<'a> {
    #[serde(flatten)]
    extra: &'a ExtraFields,
    model: &'a str,
    image: &'a str,
    prompt: &'a str,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    mask: Option<&'a str>,
}

#[derive(Serialize)]
struct VariationPayload<'a> {
    #[serde(flatten)]
    extra: &'a ExtraFields,
    model: &'a str,
    image: &'a str,
    n: u32,
}

/// Image generation, editing and variations.
pub struct Images<'c> {
    client: &'c XenoClient,
}

impl<'c> Images<'c> {
    pub(crate) fn new(client: &'c XenoClient) -> Self {
        Self { client }
    }

    /// Generates images from a text prompt.
    pub async fn generate(&self, options: ImageGenerateOptions) -> Result<ImageResponse> {
        let body = to_body(&GeneratePayload::from(&options))?;
        self.send("/images/generations", body, &options.model).await
    }

    /// Edits an existing image according to a prompt.
    pub async fn edit(&self, options: ImageEditOptions) -> Result<ImageResponse> {
        let body = to_body(&EditPayload {
            extra: &options.extra,
            model: &options.model,
            image: &options.image,
            prompt: &options.prompt,
            n: options.n,
            mask: options.mask.as_deref().filter(|m| !m.is_empty()),
        })?;
        self.send("/images/edits", body, &options.model).await
    }

    /// Generates variations of an existing image.
    pub async fn variations(
        &self,
        image: &str,
        options: ImageVariationOptions,
    ) -> Result<ImageResponse> {
        let body = to_body(&VariationPayload {
            extra: &options.extra,
            model: &options.model,
            image,
            n: options.n,
        })?;
        self.send("/images/variations", body, &options.model).await
    }

    async fn send(&self, path: &str, body: Value, model: &str) -> Result<ImageResponse> {
        let mut response: ImageResponse = self
            .client
            .request_json(RequestSpec::post(path, body))
            .await?;
        fill_model(&mut response.model, model);
        Ok(response)
    }
}
