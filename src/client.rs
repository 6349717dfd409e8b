use std::pin::Pin;
use std::sync::Arc;

use futures_util::Stream;
use reqwest::header::{
    HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER, USER_AGENT,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::{ClientBuilder, ClientConfig};
use crate::error::{Result, XenoError};
use crate::resources::{Chat, Images, Models, Music, Video};
use crate::sse;

const SDK_USER_AGENT: &str = concat!("xeno-rust/", env!("CARGO_PKG_VERSION"));

/// A lazily decoded stream of server-sent events.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// One outgoing API call: method, path relative to the base URL, and JSON body.
#[derive(Debug, Clone)]
pub(crate) struct RequestSpec<'a> {
    pub(crate) method: Method,
    pub(crate) path: &'a str,
    pub(crate) body: Option<Value>,
}

impl<'a> RequestSpec<'a> {
    pub(crate) fn get(path: &'a str) -> Self {
        Self {
            method: Method::GET,
            path,
            body: None,
        }
    }

    pub(crate) fn post(path: &'a str, body: Value) -> Self {
        Self {
            method: Method::POST,
            path,
            body: Some(body),
        }
    }
}

/// The main client for interacting with the Xeno API.
///
/// It holds the shared `reqwest::Client` and the resolved [`ClientConfig`].
/// It is cheap to clone and safe to share across tasks; every call is
/// independent of every other.
///
/// # Example
///
/// ```no_run
/// # use xeno::{ChatCompletionOptions, ChatMessage, XenoClient};
/// # #[tokio::main]
/// # async fn main() -> xeno::Result<()> {
/// let client = XenoClient::new(Some("your-api-key".to_string()))?;
///
/// let completion = client
///     .chat()
///     .create(ChatCompletionOptions::new(vec![ChatMessage::user("Hello!")]))
///     .await?;
/// println!("{:?}", completion.choices[0].message.content);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct XenoClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl XenoClient {
    /// Creates a new `XenoClient`.
    ///
    /// This method initializes the client with an API key. It first checks for the `api_key`
    /// parameter. If it's `None`, it falls back to the `XENO_API_KEY` environment variable.
    /// The base URL is read from `XENO_BASE_URL` when set.
    ///
    /// # Errors
    ///
    /// - `XenoError::Authentication` if the API key is not provided in either way.
    /// - `XenoError::RequestFailed` if the internal HTTP client fails to build.
    /// - `XenoError::UrlParseFailed` if the base URL is invalid.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let mut builder = ClientBuilder::new();
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        builder.build()
    }

    /// Creates a new `XenoClient` with a custom base URL.
    ///
    /// This is useful for testing or for connecting to a different API endpoint.
    pub fn new_with_url(api_key: String, base_url: &str) -> Result<Self> {
        ClientBuilder::new()
            .api_key(api_key)
            .base_url(base_url)
            .build()
    }

    /// Returns a builder for configuring timeout, retries and endpoint.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_config(config: ClientConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key())).map_err(
            |_| XenoError::Authentication {
                message: "API key contains characters that are not allowed in a header".to_string(),
                status: None,
            },
        )?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(SDK_USER_AGENT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn images(&self) -> Images<'_> {
        Images::new(self)
    }

    pub fn video(&self) -> Video<'_> {
        Video::new(self)
    }

    pub fn music(&self) -> Music<'_> {
        Music::new(self)
    }

    pub fn chat(&self) -> Chat<'_> {
        Chat::new(self)
    }

    pub fn models(&self) -> Models<'_> {
        Models::new(self)
    }

    /// Performs one exchange bounded by the configured timeout.
    ///
    /// The body is parsed as JSON before the status is inspected, so an
    /// unparseable body is a transport failure even on error statuses.
    pub(crate) async fn execute(&self, spec: &RequestSpec<'_>) -> Result<Value> {
        let url = self.config.endpoint(spec.path)?;
        let mut request = self.http.request(spec.method.clone(), url.clone());
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let retry_after = retry_after(response.headers());
            let bytes = response.bytes().await?;
            Ok::<_, XenoError>((status, retry_after, bytes))
        };
        let (status, retry_after, bytes) = timeout(self.config.timeout(), exchange)
            .await
            .map_err(|_| XenoError::Timeout(self.config.timeout()))??;

        debug!(method = %spec.method, %url, status = status.as_u16(), "api exchange");

        let body: Value = serde_json::from_slice(&bytes)?;
        if !status.is_success() {
            return Err(XenoError::from_response(status.as_u16(), &body, retry_after));
        }
        Ok(body)
    }

    /// Executes a request, retrying transport failures up to `max_retries` times.
    ///
    /// Errors returned by the API are final and are never retried.
    pub(crate) async fn request(&self, spec: RequestSpec<'_>) -> Result<Value> {
        let max_retries = self.config.max_retries();
        let mut attempt = 0;
        loop {
            match self.execute(&spec).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt >= max_retries => {
                    return Err(XenoError::RetriesExhausted {
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    attempt += 1;
                    warn!(
                        method = %spec.method,
                        path = spec.path,
                        attempt,
                        max_retries,
                        error = %e,
                        "request failed, retrying"
                    );
                }
            }
        }
    }

    /// Like [`request`](Self::request), decoding the body into `T`.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        spec: RequestSpec<'_>,
    ) -> Result<T> {
        let body = self.request(spec).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Like [`execute`](Self::execute), decoding the body into `T`. No retries.
    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        spec: RequestSpec<'_>,
    ) -> Result<T> {
        let body = self.execute(&spec).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Opens a streamed response and decodes its server-sent events.
    ///
    /// The request is sent once. The timeout covers receiving the response
    /// head; reading the stream itself has no deadline.
    pub(crate) async fn stream<T>(&self, spec: RequestSpec<'_>) -> Result<EventStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.config.endpoint(spec.path)?;
        let mut request = self.http.request(spec.method.clone(), url.clone());
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let response = timeout(self.config.timeout(), request.send())
            .await
            .map_err(|_| XenoError::Timeout(self.config.timeout()))??;
        let status = response.status();
        debug!(method = %spec.method, %url, status = status.as_u16(), "api stream opened");

        if !status.is_success() {
            return Err(self.classify_stream_failure(status, response).await);
        }

        Ok(Box::pin(sse::decode(Box::pin(response.bytes_stream()))))
    }

    async fn classify_stream_failure(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> XenoError {
        let retry_after = retry_after(response.headers());
        let bytes = match timeout(self.config.timeout(), response.bytes()).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => return e.into(),
            Err(_) => return XenoError::Timeout(self.config.timeout()),
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => XenoError::from_response(status.as_u16(), &body, retry_after),
            Err(e) => e.into(),
        }
    }
}

/// Reads a `Retry-After` header given in whole seconds.
fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
