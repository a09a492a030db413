//! Constants for the fetch module (pacing, timeouts, decoding).

use std::time::Duration;

/// Smallest pacing interval a fetcher accepts.
pub const LEAST_INTERVAL: Duration = Duration::from_secs(5);

/// Pacing varies by up to this much either side of the base interval.
pub const JITTER_COEF: Duration = Duration::from_secs(2);

/// HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP read timeout (30 seconds; question pages are small).
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Encoding assumed when a page does not declare one.
pub const DEFAULT_CHARSET: &str = "Shift_JIS";
