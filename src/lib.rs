//! Kakomon Core Library
//!
//! Fetches past exam questions from public archive sites, one paced request
//! at a time, and turns each page into a structured, JSON-ready record.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`query`] - Question coordinates, ranges and random sampling
//! - [`source`] - Archive descriptions and query validation
//! - [`url`] - URL templates and generation
//! - [`fetch`] - Paced, cancellable page fetching
//! - [`parser`] - Question page parsing
//! - [`response`] - The question record
//! - [`config`] - TOML configuration
//! - [`server`] - HTTP front end

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod fetch;
pub mod parser;
pub mod query;
pub mod random;
pub mod response;
pub mod server;
pub mod source;
pub mod url;
mod user_agent;

// Re-export commonly used types
pub use config::{AppConfig, LoadedConfig, SourceConfig, load_config};
pub use error::ConfigError;
pub use fetch::{FetchError, Fetcher, HttpClient, LEAST_INTERVAL, Pacer, deadline_token};
pub use parser::{ParseError, parse_html};
pub use query::{Query, QueryRange, Season, SeasonRange, ValidationError};
pub use random::SharedRng;
pub use response::{JSON_VERSION, Response};
pub use source::Source;
pub use url::UrlGenerator;
