//! Query-string parsing for the question routes.

use std::collections::HashMap;

use crate::query::{Query, QueryRange, Season, SeasonRange, ValidationError};
use crate::source::Source;

/// Parameters of `question.json`.
const YEAR: &str = "year";
const SEASON: &str = "season";
const NO: &str = "no";

/// Parameters of `random.json`.
const MIN_YEAR: &str = "min_year";
const MAX_YEAR: &str = "max_year";
const MIN_NO: &str = "min_no";
const MAX_NO: &str = "max_no";

/// Builds a single-question query.
///
/// A missing or non-numeric year or number reads as 0 and is then rejected
/// by the source. A missing season falls back to the source's fixed season.
pub(crate) fn question_query(
    params: &HashMap<String, String>,
    source: &Source,
) -> Result<Query, ValidationError> {
    let season = match non_empty(params, SEASON) {
        Some(code) => code.parse::<Season>()?,
        None => match source.range.season.fixed() {
            Some(season) => season,
            None => "".parse::<Season>()?,
        },
    };
    let query = Query::new(
        int_param(params, YEAR, 0),
        season,
        int_param(params, NO, 0),
    );
    source.validates(&query)?;
    Ok(query)
}

/// Builds a random-selection range, defaulting each bound to the source's.
pub(crate) fn random_range(
    params: &HashMap<String, String>,
    source: &Source,
) -> Result<QueryRange, ValidationError> {
    let base = source.range;
    let season = match non_empty(params, SEASON) {
        Some(code) => code.parse::<SeasonRange>()?,
        None => base.season,
    };
    let range = QueryRange::new(
        int_param(params, MIN_YEAR, base.min_year),
        int_param(params, MAX_YEAR, base.max_year),
        int_param(params, MIN_NO, base.min_no),
        int_param(params, MAX_NO, base.max_no),
        season,
    );
    source.validates_range(&range)?;
    Ok(range)
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn int_param(params: &HashMap<String, String>, key: &str, default: u32) -> u32 {
    non_empty(params, key)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
