use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::client::XenoClient;
use crate::error::{Result, XenoError};

pub const DEFAULT_BASE_URL: &str = "https://api.xenostudio.ai/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "XENO_API_KEY";
/// Environment variable consulted when no base URL is passed explicitly.
pub const BASE_URL_ENV: &str = "XENO_BASE_URL";

/// Resolved, immutable settings shared by every request a client makes.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl ClientConfig {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Builds the absolute URL for an API path such as `/models`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// A builder for [`XenoClient`].
///
/// Any setting left unset falls back to the environment (`XENO_API_KEY`,
/// `XENO_BASE_URL`) and then to the crate defaults.
///
/// # Example
///
/// ```no_run
/// # use std::time::Duration;
/// # fn main() -> xeno::Result<()> {
/// let client = xeno::XenoClient::builder()
///     .api_key("xeno-key")
///     .timeout(Duration::from_secs(30))
///     .max_retries(5)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Deadline for a single request. A zero duration selects the default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Number of extra attempts after a transport failure.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Resolves the configuration and builds the client.
    ///
    /// # Errors
    ///
    /// - [`XenoError::Authentication`] if no API key is available.
    /// - [`XenoError::UrlParseFailed`] if the base URL is invalid.
    /// - [`XenoError::RequestFailed`] if the HTTP client fails to build.
    pub fn build(self) -> Result<XenoClient> {
        let config = self.resolve(|name| env::var(name).ok())?;
        XenoClient::from_config(config)
    }

    pub(crate) fn resolve<F>(self, lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_empty(self.api_key)
            .or_else(|| non_empty(lookup(API_KEY_ENV)))
            .ok_or_else(|| XenoError::Authentication {
                message: format!(
                    "API key is required. Pass it explicitly or set the {} environment variable.",
                    API_KEY_ENV
                ),
                status: None,
            })?;

        let base_url = non_empty(self.base_url)
            .or_else(|| non_empty(lookup(BASE_URL_ENV)))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.strip_suffix('/').unwrap_or(&base_url).to_string();
        Url::parse(&base_url)?;

        let timeout = self
            .timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(ClientConfig {
            api_key,
            base_url,
            timeout,
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
