//! HTTP client for list endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::config::DEFAULT_TIMEOUT;
use crate::error::ApiError;
use crate::response::ServerResponse;

/// Anything that can answer a parameterized GET with a page of rows.
///
/// [`ServerListClient`] is the HTTP implementation; tests and screens with
/// their own transport can provide others.
#[async_trait]
pub trait Fetcher<T>: Send + Sync {
    /// Fetches `endpoint` with `params` as query string.
    async fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<ServerResponse<T>, ApiError>;
}

#[async_trait]
impl<T, F> Fetcher<T> for Arc<F>
where
    T: Send + 'static,
    F: Fetcher<T> + ?Sized,
{
    async fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<ServerResponse<T>, ApiError> {
        (**self).get(endpoint, params).await
    }
}

/// HTTP client for paginated `{data, meta}` endpoints.
///
/// Cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// let client = ServerListClient::builder()
///     .base_url("https://api.example.com/v1")
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let page: ServerResponse<User> = client.get("/users", &params).await?;
/// ```
#[derive(Clone)]
pub struct ServerListClient {
    inner: Arc<ServerListClientInner>,
}

struct ServerListClientInner {
    base_url: String,
    http_client: Client,
    timeout: Duration,
}

impl ServerListClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> ServerListClientBuilder<Missing> {
        ServerListClientBuilder::new()
    }

    /// Builds a client from a [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// See [`ServerListClientBuilder::build`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::builder()
            .base_url(config.base_url.clone())
            .timeout(config.timeout)
            .build()
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Resolves `endpoint` against the base URL.
    ///
    /// Absolute endpoints are used as-is; relative ones are appended to the
    /// base path.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        let joined = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!(
                "{}/{}",
                self.inner.base_url.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            )
        };
        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))
    }

    fn map_send_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.inner.timeout)
        } else {
            ApiError::Network(err)
        }
    }
}

#[async_trait]
impl<T> Fetcher<T> for ServerListClient
where
    T: DeserializeOwned + Send + 'static,
{
    async fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<ServerResponse<T>, ApiError> {
        let url = self.endpoint_url(endpoint)?;
        log::debug!("GET {url} {params:?}");

        let response = self
            .inner
            .http_client
            .get(url)
            .query(params)
            .timeout(self.inner.timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(ApiError::http(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::parse_with_body(e.to_string(), body))
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`ServerListClient`].
///
/// The base URL is required; the typestate makes `build` unavailable until it
/// is set.
pub struct ServerListClientBuilder<U> {
    base_url: U,
    timeout: Duration,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl ServerListClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: Missing,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the base URL endpoints are resolved against.
    pub fn base_url(self, url: impl Into<String>) -> ServerListClientBuilder<Set<String>> {
        ServerListClientBuilder {
            base_url: Set(url.into()),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for ServerListClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> ServerListClientBuilder<U> {
    /// Sets the request timeout.
    ///
    /// Defaults to 15 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client, e.g. one with auth headers preconfigured.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl ServerListClientBuilder<Set<String>> {
    /// Builds the [`ServerListClient`].
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidUrl`] if the base URL does not parse,
    /// [`ApiError::Network`] if the default HTTP client cannot be created.
    pub fn build(self) -> Result<ServerListClient, ApiError> {
        let base_url = self.base_url.0;
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(ServerListClient {
            inner: Arc::new(ServerListClientInner {
                base_url,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

impl std::fmt::Debug for ServerListClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerListClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ServerListClient {
        ServerListClient::builder().base_url(base).build().unwrap()
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let c = client("https://api.example.com/v1/");
        assert_eq!(
            c.endpoint_url("/users").unwrap().as_str(),
            "https://api.example.com/v1/users"
        );
        assert_eq!(
            c.endpoint_url("roles").unwrap().as_str(),
            "https://api.example.com/v1/roles"
        );
        assert_eq!(
            c.endpoint_url("http://other.test/x").unwrap().as_str(),
            "http://other.test/x"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ServerListClient::builder().base_url("not a url").build(),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(client("http://localhost").timeout(), Duration::from_secs(15));
    }
}
