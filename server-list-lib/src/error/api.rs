//! API error types

use std::time::Duration;

use serde::Deserialize;

/// Banner text used when a failure carries no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Error al cargar datos";

/// Errors that can occur while fetching a page from the list endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the API.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE))]
    Http {
        /// HTTP status code.
        status: u16,
        /// The `message` field of the error body, if the body had one.
        message: Option<String>,
        /// Raw response body.
        body: String,
    },

    /// Network error during API call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse API response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Creates a new HTTP error, pulling `message` out of a JSON body when present.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty());
        Self::Http {
            status,
            message,
            body,
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for transport-level failures (connectivity, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// The text shown in the list's error banner.
    ///
    /// A structured `{message}` from the server wins. Transport failures use
    /// their own description. Anything else falls back to
    /// [`GENERIC_ERROR_MESSAGE`].
    pub fn banner_message(&self) -> String {
        match self {
            Self::Http {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Http { message: None, .. } | Self::Parse { .. } => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
            Self::Network(_) | Self::Timeout(_) | Self::InvalidUrl(_) => self.to_string(),
        }
    }
}
