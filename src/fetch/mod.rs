//! Paced, cancellable fetching of question pages.
//!
//! A [`Fetcher`] is bound to one [`Source`]. Each call:
//!
//! 1. builds the URL (validation errors return before anything else),
//! 2. returns [`FetchError::Cancelled`] at once if the token is already
//!    cancelled,
//! 3. waits for its pacing slot, giving up without taking the slot if the
//!    token fires first,
//! 4. fetches, decodes and parses the page on a spawned task, racing it
//!    against the caller's [`CancellationToken`].
//!
//! When the token wins, the spawned task is left to finish on its own and
//! its result is discarded.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use kakomon_core::fetch::{Fetcher, LEAST_INTERVAL, deadline_token};
//! use kakomon_core::query::{Query, Season};
//! use kakomon_core::random::SharedRng;
//! use kakomon_core::source::Source;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(Source::fe(), LEAST_INTERVAL, SharedRng::from_entropy())?;
//! let token = deadline_token(Duration::from_secs(10));
//! let res = fetcher.get(&Query::new(29, Season::Autumn, 1), &token).await?;
//! println!("{}", res.question);
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod pacing;

pub use client::HttpClient;
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_CHARSET, JITTER_COEF, LEAST_INTERVAL, READ_TIMEOUT_SECS,
};
pub use error::FetchError;
pub use pacing::Pacer;

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::ConfigError;
use crate::query::{Query, QueryRange, ValidationError};
use crate::random::SharedRng;
use crate::response::Response;
use crate::source::Source;
use crate::url::UrlGenerator;

/// Rate-limited fetcher for one question source.
///
/// Calls on one fetcher are paced against each other; fetchers for
/// different sources pace independently.
#[derive(Debug)]
pub struct Fetcher {
    urls: UrlGenerator,
    pacer: Pacer,
    client: HttpClient,
}

impl Fetcher {
    /// Creates a fetcher that decodes pages as Shift_JIS by default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IntervalBelowFloor`] when `interval` is below
    /// [`LEAST_INTERVAL`], or any error of [`UrlGenerator::new`].
    pub fn new(source: Source, interval: Duration, rng: SharedRng) -> Result<Self, ConfigError> {
        Self::with_charset(source, interval, rng, DEFAULT_CHARSET)
    }

    /// Creates a fetcher with an explicit fallback charset.
    ///
    /// # Errors
    ///
    /// Same as [`Fetcher::new`], plus [`ConfigError::HttpClient`].
    pub fn with_charset(
        source: Source,
        interval: Duration,
        rng: SharedRng,
        charset: &str,
    ) -> Result<Self, ConfigError> {
        let pacer = Pacer::new(interval, rng.clone())?;
        let urls = UrlGenerator::new(source, rng)?;
        let client = HttpClient::new(charset)?;
        Ok(Self {
            urls,
            pacer,
            client,
        })
    }

    /// The source this fetcher serves.
    #[must_use]
    pub fn source(&self) -> &Source {
        self.urls.source()
    }

    /// Base pacing interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.pacer.interval()
    }

    /// URL for `query`, without fetching it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the query is outside the source.
    pub fn generate_url(&self, query: &Query) -> Result<String, ValidationError> {
        self.urls.generate(query)
    }

    /// URL of a random question in `range`, without fetching it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `range` does not fit the source.
    pub fn random_url(&self, range: &QueryRange) -> Result<String, ValidationError> {
        self.urls.random(range)
    }

    /// Fetches and parses one question.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Validation`] before any pacing or network activity
    /// - [`FetchError::Cancelled`] when `cancel` fires first
    /// - [`FetchError::Network`], [`FetchError::HttpStatus`],
    ///   [`FetchError::Decode`] or [`FetchError::Parse`] from the page itself
    #[instrument(skip(self, cancel), fields(query = %query))]
    pub async fn get(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<Response, FetchError> {
        let url = self.urls.generate(query)?;
        self.fetch(url, cancel).await
    }

    /// Fetches and parses a random question in `range`.
    ///
    /// [`QueryRange::SOURCE_MAX`] selects from the whole source.
    ///
    /// # Errors
    ///
    /// Same as [`Fetcher::get`].
    #[instrument(skip(self, cancel))]
    pub async fn get_random(
        &self,
        range: &QueryRange,
        cancel: &CancellationToken,
    ) -> Result<Response, FetchError> {
        let url = self.urls.random(range)?;
        self.fetch(url, cancel).await
    }

    async fn fetch(&self, url: String, cancel: &CancellationToken) -> Result<Response, FetchError> {
        if cancel.is_cancelled() {
            debug!(url = %url, "token already cancelled; not fetching");
            return Err(FetchError::cancelled(url));
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(url = %url, "cancelled while waiting for pacing slot");
                return Err(FetchError::cancelled(url));
            }
            _ = self.pacer.acquire() => {}
        }
        if cancel.is_cancelled() {
            return Err(FetchError::cancelled(url));
        }

        let client = self.client.clone();
        let task_url = url.clone();
        let task = tokio::spawn(async move { client.fetch_response(&task_url).await });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(url = %url, "abandoning in-flight fetch");
                Err(FetchError::cancelled(url))
            }
            joined = task => match joined {
                Ok(result) => result.map(|res| res.with_url(url)),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(_) => Err(FetchError::cancelled(url)),
            },
        }
    }
}

/// A token that cancels itself after `timeout`.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn deadline_token(timeout: Duration) -> CancellationToken {
    let token = CancellationToken::new();
    let timer = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(timeout) => timer.cancel(),
            () = timer.cancelled() => {}
        }
    });
    token
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::query::Season;

    fn fetcher() -> Fetcher {
        Fetcher::new(Source::fe(), LEAST_INTERVAL, SharedRng::seeded(7)).unwrap()
    }

    #[test]
    fn test_new_rejects_short_interval() {
        let err = Fetcher::new(Source::fe(), Duration::from_secs(1), SharedRng::seeded(1))
            .unwrap_err();
        assert!(matches!(err, ConfigError::IntervalBelowFloor { .. }));
    }

    #[test]
    fn test_new_rejects_bad_template() {
        let source = Source {
            url: "not a url {{.Year}}".to_string(),
            ..Source::fe()
        };
        let err = Fetcher::new(source, LEAST_INTERVAL, SharedRng::seeded(1)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_generate_url_delegates() {
        let fetcher = fetcher();
        assert_eq!(
            fetcher.generate_url(&Query::new(29, Season::Autumn, 80)).unwrap(),
            "http://www.fe-siken.com/kakomon/29_aki/q80.html"
        );
        assert_eq!(fetcher.source(), &Source::fe());
        assert_eq!(fetcher.interval(), LEAST_INTERVAL);
    }

    #[test]
    fn test_random_url_uses_source() {
        let url = fetcher().random_url(&QueryRange::SOURCE_MAX).unwrap();
        assert!(url.starts_with("http://www.fe-siken.com/kakomon/"), "got: {url}");
    }

    #[tokio::test]
    async fn test_get_validates_before_network() {
        let token = CancellationToken::new();
        let err = fetcher()
            .get(&Query::new(12, Season::Spring, 1), &token)
            .await
            .unwrap_err();
        assert!(err.is_validation(), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_get_with_cancelled_token() {
        let token = CancellationToken::new();
        token.cancel();
        let err = fetcher()
            .get(&Query::new(29, Season::Autumn, 1), &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled(), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_get_random_with_cancelled_token() {
        let token = CancellationToken::new();
        token.cancel();
        let err = fetcher()
            .get_random(&QueryRange::SOURCE_MAX, &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled(), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_deadline_expires_while_waiting_for_pacing() {
        tokio::time::pause();

        let fetcher = fetcher();
        fetcher.pacer.acquire().await;

        let token = deadline_token(Duration::from_secs(1));
        let start = tokio::time::Instant::now();
        let err = fetcher
            .get(&Query::new(29, Season::Autumn, 1), &token)
            .await
            .unwrap_err();

        assert!(err.is_cancelled(), "got: {err:?}");
        let held = start.elapsed();
        assert!(
            held >= Duration::from_secs(1) && held < Duration::from_secs(2),
            "held {held:?}"
        );
    }

    #[tokio::test]
    async fn test_cancelled_wait_does_not_take_pacing_slot() {
        tokio::time::pause();

        let fetcher = fetcher();
        fetcher.pacer.acquire().await;
        let token = deadline_token(Duration::from_secs(1));
        fetcher
            .get(&Query::new(29, Season::Autumn, 1), &token)
            .await
            .unwrap_err();

        // The next slot is still measured from the first request
        tokio::time::sleep(Duration::from_secs(7)).await;
        let start = tokio::time::Instant::now();
        assert_eq!(fetcher.pacer.acquire().await, Duration::ZERO);
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_deadline_token_fires() {
        tokio::time::pause();

        let token = deadline_token(Duration::from_secs(3));
        assert!(!token.is_cancelled());
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(token.is_cancelled());
    }
}
