use std::time::Duration;

use serde_json::Value;

/// A convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, XenoError>;

/// Represents the possible errors that can occur when using the Xeno SDK.
///
/// The first five variants are returned by the remote API itself (classified
/// from the HTTP status code) and are never retried. The remaining variants
/// describe failures to complete an exchange at all.
#[derive(Debug, thiserror::Error)]
pub enum XenoError {
    /// The API key is missing or was rejected (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        status: Option<u16>,
    },
    /// Too many requests (HTTP 429).
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        status: Option<u16>,
        /// Seconds to wait, taken from the `Retry-After` header when present.
        retry_after: Option<u64>,
    },
    /// The request was malformed or rejected by validation (HTTP 400).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        status: Option<u16>,
    },
    /// The account does not have enough credits (HTTP 402).
    #[error("Insufficient credits: {message}")]
    InsufficientCredits {
        message: String,
        status: Option<u16>,
    },
    /// Any other non-successful status code.
    #[error("API request failed: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// The body could not be parsed as JSON, or a payload failed to serialize.
    #[error("Failed to parse API response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL parsing failed: {0}")]
    UrlParseFailed(#[from] url::ParseError),
    /// Every attempt failed at the transport level; holds the last cause.
    #[error("Request failed: {source}")]
    RetriesExhausted { source: Box<XenoError> },
}

const UNKNOWN_ERROR: &str = "Unknown error";

impl XenoError {
    /// Maps a non-successful HTTP response onto a typed error.
    ///
    /// The message is read from `error.message`, then from a top-level
    /// `message`, and falls back to `"Unknown error"`.
    pub fn from_response(status: u16, body: &Value, retry_after: Option<u64>) -> Self {
        let message = error_message(body);
        let status_code = Some(status);
        match status {
            401 => XenoError::Authentication {
                message,
                status: status_code,
            },
            429 => XenoError::RateLimit {
                message,
                status: status_code,
                retry_after,
            },
            400 => XenoError::InvalidRequest {
                message,
                status: status_code,
            },
            402 => XenoError::InsufficientCredits {
                message,
                status: status_code,
            },
            _ => XenoError::Api {
                message,
                status: status_code,
            },
        }
    }

    /// The HTTP status code attached to an API error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            XenoError::Authentication { status, .. }
            | XenoError::RateLimit { status, .. }
            | XenoError::InvalidRequest { status, .. }
            | XenoError::InsufficientCredits { status, .. }
            | XenoError::Api { status, .. } => *status,
            XenoError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The server's `Retry-After` hint in seconds, for rate limit errors.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            XenoError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Whether the error is a definitive answer from the API.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            XenoError::Authentication { .. }
                | XenoError::RateLimit { .. }
                | XenoError::InvalidRequest { .. }
                | XenoError::InsufficientCredits { .. }
                | XenoError::Api { .. }
        )
    }

    /// Whether the request could be attempted again.
    ///
    /// Only failures where the outcome of the exchange is unknown qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            XenoError::Timeout(_) | XenoError::RequestFailed(_) | XenoError::Json(_)
        )
    }
}

fn error_message(body: &Value) -> String {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .or_else(|| {
            body.get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
        })
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}
