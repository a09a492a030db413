//! Error types for query and range validation.

use thiserror::Error;

/// A query or query range that falls outside what a source can serve.
///
/// Returned before any network activity, so callers can map it straight to a
/// "bad request" style answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Year outside the source's `[min, max]` bounds.
    #[error("year must be in [{min}:{max}], but {got}")]
    YearOutOfRange {
        /// Lowest year the source serves.
        min: u32,
        /// Highest year the source serves.
        max: u32,
        /// The rejected year.
        got: u32,
    },

    /// Question number outside the source's `[min, max]` bounds.
    #[error("question no. must be in [{min}:{max}], but {got}")]
    NoOutOfRange {
        /// Lowest question number the source serves.
        min: u32,
        /// Highest question number the source serves.
        max: u32,
        /// The rejected number.
        got: u32,
    },

    /// The source only serves one season and the request asked for another.
    #[error("season must be {expected}, but {got}")]
    SeasonMismatch {
        /// Season code the source is fixed to.
        expected: &'static str,
        /// Season code that was requested.
        got: &'static str,
    },

    /// `max_year` below `min_year`.
    #[error("max year must not be less than min year, but max: {max}, min: {min}")]
    InvertedYears {
        /// Lower bound given.
        min: u32,
        /// Upper bound given.
        max: u32,
    },

    /// `max_no` below `min_no`.
    #[error("max no. must not be less than min no., but max: {max}, min: {min}")]
    InvertedNos {
        /// Lower bound given.
        min: u32,
        /// Upper bound given.
        max: u32,
    },

    /// A season code that is not one of the accepted values.
    #[error("season must be one of {accepted}, but '{got}'")]
    UnknownSeason {
        /// Human readable list of accepted codes.
        accepted: &'static str,
        /// The unrecognized input.
        got: String,
    },
}
