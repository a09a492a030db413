//! Turning queries into archive URLs.
//!
//! A [`UrlGenerator`] owns one [`Source`] and its compiled [`UrlTemplate`].
//! Every URL it emits comes from a query that passed the source's validation.
//!
//! # Example
//!
//! ```
//! use kakomon_core::query::{Query, Season};
//! use kakomon_core::random::SharedRng;
//! use kakomon_core::source::Source;
//! use kakomon_core::url::UrlGenerator;
//!
//! let urls = UrlGenerator::new(Source::fe(), SharedRng::seeded(1)).unwrap();
//! let url = urls.generate(&Query::new(28, Season::Spring, 2)).unwrap();
//! assert_eq!(url, "http://www.fe-siken.com/kakomon/28_haru/q2.html");
//! ```

mod template;

pub use template::UrlTemplate;

use chrono::{Local, NaiveDate};
use tracing::{debug, instrument};

use crate::error::ConfigError;
use crate::query::{Query, QueryRange, Season, ValidationError};
use crate::random::SharedRng;
use crate::source::Source;

/// URL factory bound to one source.
#[derive(Debug, Clone)]
pub struct UrlGenerator {
    source: Source,
    template: UrlTemplate,
    rng: SharedRng,
}

impl UrlGenerator {
    /// Compiles the source's template.
    ///
    /// The template is test-rendered with the source's lowest query and must
    /// produce an absolute URL with a host.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSource`] for an inverted source range and
    /// [`ConfigError::InvalidTemplate`] for a template that does not compile
    /// or does not render to a URL.
    pub fn new(source: Source, rng: SharedRng) -> Result<Self, ConfigError> {
        source.validate_self().map_err(ConfigError::InvalidSource)?;
        let template = UrlTemplate::compile(&source.url)?;

        let probe = Query::new(
            source.range.min_year,
            source.range.season.fixed().unwrap_or(Season::Spring),
            source.range.min_no,
        );
        let rendered = template.render(&probe);
        match ::url::Url::parse(&rendered) {
            Ok(parsed) if parsed.host_str().is_some() => {}
            Ok(_) => {
                return Err(ConfigError::invalid_template(
                    &source.url,
                    format!("rendered URL '{rendered}' has no host"),
                ));
            }
            Err(e) => {
                return Err(ConfigError::invalid_template(
                    &source.url,
                    format!("rendered URL '{rendered}' is not a URL: {e}"),
                ));
            }
        }

        Ok(Self {
            source,
            template,
            rng,
        })
    }

    /// The source this generator serves.
    #[must_use]
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Builds the URL for one question.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the query is outside the source.
    #[instrument(level = "debug", skip(self), fields(query = %query))]
    pub fn generate(&self, query: &Query) -> Result<String, ValidationError> {
        self.source.validates(query)?;
        let url = self.template.render(query);
        debug!(url = %url, "generated URL");
        Ok(url)
    }

    /// Builds the URL of a random question in `range`, as of today.
    ///
    /// [`QueryRange::SOURCE_MAX`] selects from the whole source.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `range` does not fit the source.
    pub fn random(&self, range: &QueryRange) -> Result<String, ValidationError> {
        self.random_at(range, Local::now().date_naive())
    }

    /// Like [`random`](Self::random) with an explicit calendar day.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `range` does not fit the source.
    pub fn random_at(
        &self,
        range: &QueryRange,
        today: NaiveDate,
    ) -> Result<String, ValidationError> {
        let query = self.random_query_at(range, today)?;
        self.generate(&query)
    }

    /// Draws a random query in `range` without rendering it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `range` does not fit the source.
    pub fn random_query_at(
        &self,
        range: &QueryRange,
        today: NaiveDate,
    ) -> Result<Query, ValidationError> {
        if !range.is_source_max() {
            self.source.validates_range(range)?;
        }
        let range = self.source.resolve_range(range);
        let query = range.sample(&self.rng, self.source.autumn_policy(today));
        debug!(query = %query, "sampled random query");
        Ok(query)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::query::SeasonRange;

    fn small_source() -> Source {
        Source {
            url: "https://archive.example/{{.Year}}_{{.Season}}/q{{.No}}.html".to_string(),
            range: QueryRange::new(20, 22, 1, 5, SeasonRange::All),
            autumn_cutoff: NaiveDate::from_ymd_opt(2020, 12, 1),
        }
    }

    fn generator(source: Source) -> UrlGenerator {
        UrlGenerator::new(source, SharedRng::seeded(17)).unwrap()
    }

    #[test]
    fn test_generate_substitutes_every_valid_query() {
        let urls = generator(small_source());
        for year in 20..=22 {
            for season in Season::ALL {
                for no in 1..=5 {
                    let url = urls.generate(&Query::new(year, season, no)).unwrap();
                    assert_eq!(
                        url,
                        format!("https://archive.example/{year}_{}/q{no}.html", season.code())
                    );
                }
            }
        }
    }

    #[test]
    fn test_generate_rejects_out_of_range() {
        let urls = generator(small_source());
        assert!(urls.generate(&Query::new(19, Season::Spring, 1)).is_err());
        assert!(urls.generate(&Query::new(23, Season::Spring, 1)).is_err());
        assert!(urls.generate(&Query::new(20, Season::Spring, 0)).is_err());
        assert!(urls.generate(&Query::new(20, Season::Spring, 6)).is_err());
    }

    #[test]
    fn test_generate_rejects_season_mismatch_on_fixed_source() {
        let mut source = small_source();
        source.range.season = SeasonRange::Autumn;
        let urls = generator(source);
        assert!(matches!(
            urls.generate(&Query::new(21, Season::Spring, 1)),
            Err(ValidationError::SeasonMismatch { .. })
        ));
    }

    #[test]
    fn test_new_rejects_bad_template() {
        let mut source = small_source();
        source.url = "https://archive.example/{{.Nope}}".to_string();
        assert!(matches!(
            UrlGenerator::new(source, SharedRng::seeded(1)),
            Err(ConfigError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_new_rejects_template_that_is_not_a_url() {
        let mut source = small_source();
        source.url = "{{.Year}}/{{.No}}".to_string();
        assert!(matches!(
            UrlGenerator::new(source, SharedRng::seeded(1)),
            Err(ConfigError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_new_rejects_inverted_source() {
        let mut source = small_source();
        source.range = QueryRange::new(22, 20, 1, 5, SeasonRange::All);
        assert!(matches!(
            UrlGenerator::new(source, SharedRng::seeded(1)),
            Err(ConfigError::InvalidSource(_))
        ));
    }

    #[test]
    fn test_random_sentinel_uses_source_range() {
        let urls = generator(small_source());
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for _ in 0..200 {
            let q = urls.random_query_at(&QueryRange::SOURCE_MAX, today).unwrap();
            assert!((20..=22).contains(&q.year));
            assert!((1..=5).contains(&q.no));
        }
    }

    #[test]
    fn test_random_rejects_range_outside_source() {
        let urls = generator(small_source());
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let range = QueryRange::new(20, 30, 1, 5, SeasonRange::All);
        assert!(urls.random_at(&range, today).is_err());
        // An all-zero range is an ordinary range, not the sentinel.
        assert!(urls.random_at(&QueryRange::default(), today).is_err());
    }

    #[test]
    fn test_random_before_cutoff_skips_latest_autumn() {
        let urls = generator(small_source());
        let before = NaiveDate::from_ymd_opt(2020, 11, 30).unwrap();
        for _ in 0..1000 {
            let url = urls.random_at(&QueryRange::SOURCE_MAX, before).unwrap();
            assert!(!url.contains("/22_aki/"), "unpublished autumn drawn: {url}");
        }
    }

    #[test]
    fn test_random_after_cutoff_reaches_latest_autumn() {
        let urls = generator(small_source());
        let after = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();
        let range = QueryRange::new(22, 22, 1, 5, SeasonRange::Autumn);
        let url = urls.random_at(&range, after).unwrap();
        assert!(url.contains("/22_aki/"), "got: {url}");
    }
}
