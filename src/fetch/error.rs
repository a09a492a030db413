//! Error types for fetching question pages.

use thiserror::Error;

use crate::parser::ParseError;
use crate::query::ValidationError;

/// Errors that can end a fetch call.
///
/// Every variant is terminal for the call: there is no partial result and no
/// automatic retry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The query or range was rejected before any request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network-level failure (DNS, connect, TLS, timeout).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The page being fetched.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The archive answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The page being fetched.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The body could not be read or decoded to text.
    #[error("failed to decode page {url}: {source}")]
    Decode {
        /// The page being fetched.
        url: String,
        /// The underlying body error.
        #[source]
        source: reqwest::Error,
    },

    /// The page does not have the question layout.
    #[error("failed to parse page {url}: {source}")]
    Parse {
        /// The page that was fetched.
        url: String,
        /// What was missing.
        #[source]
        source: ParseError,
    },

    /// The caller's deadline passed or it cancelled before the page arrived.
    #[error("request for {url} cancelled before completion")]
    Cancelled {
        /// The page that was being fetched.
        url: String,
    },
}

impl FetchError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(url: impl Into<String>, source: ParseError) -> Self {
        Self::Parse {
            url: url.into(),
            source,
        }
    }

    /// Creates a cancellation error.
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::Cancelled { url: url.into() }
    }

    /// Whether the call ended because the caller stopped waiting.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether the request itself was invalid.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
