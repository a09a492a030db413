//! Request pacing for one question source.
//!
//! A [`Pacer`] keeps successive requests of one fetcher at least a jittered
//! interval apart. The jitter keeps the archive from seeing a perfectly
//! periodic client.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use kakomon_core::fetch::Pacer;
//! use kakomon_core::random::SharedRng;
//!
//! # async fn example() {
//! let pacer = Pacer::new(Duration::from_secs(5), SharedRng::seeded(1)).unwrap();
//!
//! // First request proceeds immediately
//! pacer.acquire().await;
//!
//! // Second request waits 3-7 seconds after the first
//! pacer.acquire().await;
//! # }
//! ```

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use super::constants::{JITTER_COEF, LEAST_INTERVAL};
use crate::error::ConfigError;
use crate::random::SharedRng;

/// Jittered minimum spacing between requests.
///
/// Designed to be shared by reference across tasks. The last-request time is
/// guarded by a `tokio::sync::Mutex` held across the wait, so concurrent
/// callers queue up and are released one spacing apart.
#[derive(Debug)]
pub struct Pacer {
    /// Base spacing between requests.
    interval: Duration,

    /// Maximum deviation from `interval`, either direction.
    jitter: Duration,

    /// Shared stream for jitter draws.
    rng: SharedRng,

    /// Time the previous request was released.
    /// `None` until the first request, which is not delayed.
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Creates a pacer with the standard jitter window.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IntervalBelowFloor`] when `interval` is below
    /// [`LEAST_INTERVAL`].
    #[instrument(skip(rng), fields(interval_ms = interval.as_millis()))]
    pub fn new(interval: Duration, rng: SharedRng) -> Result<Self, ConfigError> {
        if interval < LEAST_INTERVAL {
            return Err(ConfigError::IntervalBelowFloor {
                given: interval,
                floor: LEAST_INTERVAL,
            });
        }
        debug!("creating pacer");
        Ok(Self {
            interval,
            jitter: JITTER_COEF,
            rng,
            last_request: Mutex::new(None),
        })
    }

    /// Base spacing between requests.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Smallest spacing the pacer ever enforces.
    #[must_use]
    pub fn min_spacing(&self) -> Duration {
        self.interval.saturating_sub(self.jitter)
    }

    /// Waits until this request may be sent, then records it.
    ///
    /// Returns how long the caller was held.
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> Duration {
        let mut last_request = self.last_request.lock().await;
        let spacing = self.jittered_spacing();

        let mut waited = Duration::ZERO;
        if let Some(previous) = *last_request {
            let elapsed = previous.elapsed();
            if elapsed < spacing {
                waited = spacing - elapsed;
                debug!(
                    spacing_ms = spacing.as_millis(),
                    delay_ms = waited.as_millis(),
                    "pacing request"
                );
                tokio::time::sleep(waited).await;
            }
        } else {
            debug!("first request - no delay");
        }

        *last_request = Some(Instant::now());
        waited
    }

    fn jittered_spacing(&self) -> Duration {
        let window = i64::try_from(self.jitter.as_millis()).unwrap_or(i64::MAX);
        let offset = self.rng.gen_range_inclusive(-window, window);
        let magnitude = Duration::from_millis(offset.unsigned_abs());
        if offset >= 0 {
            self.interval.saturating_add(magnitude)
        } else {
            self.interval.saturating_sub(magnitude)
        }
    }
}
