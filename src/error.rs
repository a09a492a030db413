//! Construction-time configuration errors.
//!
//! These are raised while building generators and fetchers from a
//! [`Source`](crate::source::Source) and are never retried: the configuration
//! has to be fixed.

use std::time::Duration;

use thiserror::Error;

use crate::query::ValidationError;

/// A source or fetcher configuration that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The URL template does not compile or renders something that is not a URL.
    #[error("invalid URL template '{template}': {reason}")]
    InvalidTemplate {
        /// The offending template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Pacing interval shorter than the allowed minimum.
    #[error("interval {given:?} is below the minimum of {floor:?}")]
    IntervalBelowFloor {
        /// Interval that was requested.
        given: Duration,
        /// Smallest interval allowed.
        floor: Duration,
    },

    /// The source's own range is malformed.
    #[error("invalid source range: {0}")]
    InvalidSource(#[source] ValidationError),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl ConfigError {
    /// Creates an invalid template error.
    pub fn invalid_template(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
            reason: reason.into(),
        }
    }
}
