//! HTTP client wrapper for question pages.
//!
//! One request per page: fetch, check the status, decode the body to text,
//! parse. No redirects are special-cased and nothing is retried.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::FetchError;
use crate::error::ConfigError;
use crate::parser::parse_html;
use crate::response::Response;
use crate::user_agent;

/// HTTP client for question pages.
///
/// Cheap to clone; clones share one connection pool.
///
/// # Example
///
/// ```no_run
/// use kakomon_core::fetch::HttpClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new("Shift_JIS")?;
/// let page = client
///     .fetch_html("http://www.fe-siken.com/kakomon/29_aki/q1.html")
///     .await?;
/// println!("{} bytes", page.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    charset: String,
}

impl HttpClient {
    /// Creates a client that decodes undeclared bodies as `charset`.
    ///
    /// Default configuration:
    /// - Connect timeout: 10 seconds
    /// - Overall timeout: 30 seconds
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the client cannot be built.
    pub fn new(charset: impl Into<String>) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(user_agent::default_fetch_user_agent())
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self {
            client,
            charset: charset.into(),
        })
    }

    /// Charset assumed when the response does not declare one.
    #[must_use]
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Fetches `url` and returns the decoded body.
    ///
    /// A charset in the `Content-Type` header wins over the configured one.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] when the request cannot be completed
    /// - [`FetchError::HttpStatus`] for any non-2xx status
    /// - [`FetchError::Decode`] when the body cannot be read
    #[instrument(skip(self), fields(charset = %self.charset))]
    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "archive returned error status");
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        let body = response
            .text_with_charset(&self.charset)
            .await
            .map_err(|e| FetchError::decode(url, e))?;
        debug!(bytes = body.len(), "page received");
        Ok(body)
    }

    /// Fetches `url` and parses it into a [`Response`].
    ///
    /// The returned record's `url` is left empty; the caller stamps it.
    ///
    /// # Errors
    ///
    /// Any error of [`HttpClient::fetch_html`], or [`FetchError::Parse`].
    pub async fn fetch_response(&self, url: &str) -> Result<Response, FetchError> {
        let html = self.fetch_html(url).await?;
        parse_html(&html).map_err(|e| FetchError::parse(url, e))
    }
}
