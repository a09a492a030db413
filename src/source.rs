//! Question sources: where questions come from and which ones exist.
//!
//! A [`Source`] pairs a URL template with the [`QueryRange`] the archive
//! actually serves. It is built once at startup and only read afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::{AutumnPolicy, Query, QueryRange, Season, SeasonRange, ValidationError};

/// Static description of one question archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// URL template with `{{.Year}}`, `{{.Season}}` and `{{.No}}` placeholders.
    pub url: String,

    /// Every question the archive serves.
    pub range: QueryRange,

    /// Before this date the autumn sitting of `range.max_year` is not
    /// published yet and random picks avoid it.
    #[serde(default)]
    pub autumn_cutoff: Option<NaiveDate>,
}

impl Source {
    /// Fundamental Information Technology Engineer archive.
    #[must_use]
    pub fn fe() -> Self {
        Self {
            url: "http://www.fe-siken.com/kakomon/{{.Year}}_{{.Season}}/q{{.No}}.html".to_string(),
            range: QueryRange::new(13, 29, 1, 80, SeasonRange::All),
            autumn_cutoff: NaiveDate::from_ymd_opt(2017, 11, 20),
        }
    }

    /// Applied Information Technology Engineer archive.
    #[must_use]
    pub fn ap() -> Self {
        Self {
            url: "http://www.ap-siken.com/kakomon/{{.Year}}_{{.Season}}/q{{.No}}.html".to_string(),
            range: QueryRange::new(13, 29, 1, 80, SeasonRange::All),
            autumn_cutoff: NaiveDate::from_ymd_opt(2017, 11, 20),
        }
    }

    /// Checks the source's own range is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the range bounds are inverted.
    pub fn validate_self(&self) -> Result<(), ValidationError> {
        self.range.check_order()
    }

    /// Checks a query names a question this source serves.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the year or number is out of bounds,
    /// or the source is fixed to a season the query does not ask for.
    pub fn validates(&self, query: &Query) -> Result<(), ValidationError> {
        let range = &self.range;
        if query.year < range.min_year || query.year > range.max_year {
            return Err(ValidationError::YearOutOfRange {
                min: range.min_year,
                max: range.max_year,
                got: query.year,
            });
        }
        if query.no < range.min_no || query.no > range.max_no {
            return Err(ValidationError::NoOutOfRange {
                min: range.min_no,
                max: range.max_no,
                got: query.no,
            });
        }
        if let Some(expected) = range.season.fixed()
            && expected != query.season
        {
            return Err(ValidationError::SeasonMismatch {
                expected: expected.code(),
                got: query.season.code(),
            });
        }
        Ok(())
    }

    /// Checks a random-selection range fits inside this source.
    ///
    /// Both corners are validated as queries, then the bound order, then the
    /// season constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] describing the first violation found.
    pub fn validates_range(&self, range: &QueryRange) -> Result<(), ValidationError> {
        // The range's own season is checked below; corners borrow one the
        // source accepts.
        let placeholder = self.range.season.fixed().unwrap_or(Season::Spring);
        self.validates(&Query::new(range.max_year, placeholder, range.max_no))?;
        self.validates(&Query::new(range.min_year, placeholder, range.min_no))?;

        range.check_order()?;

        if let Some(expected) = self.range.season.fixed()
            && range.season != SeasonRange::from(expected)
        {
            return Err(ValidationError::SeasonMismatch {
                expected: expected.code(),
                got: range.season.code(),
            });
        }
        Ok(())
    }

    /// Resolves the sentinel range to this source's own range.
    #[must_use]
    pub fn resolve_range(&self, range: &QueryRange) -> QueryRange {
        if range.is_source_max() {
            debug!("sentinel range given, using source range");
            self.range
        } else {
            *range
        }
    }

    /// Sampling policy for the given calendar day.
    #[must_use]
    pub fn autumn_policy(&self, today: NaiveDate) -> AutumnPolicy {
        AutumnPolicy {
            source_max_year: self.range.max_year,
            latest_autumn_unpublished: self.autumn_cutoff.is_some_and(|cutoff| today < cutoff),
        }
    }
}
