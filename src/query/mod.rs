//! Query model: which question to fetch, and the bounds for random picks.
//!
//! A [`Query`] names one concrete question (year, season, number). A
//! [`QueryRange`] bounds a random draw. Seasons are split into two types so a
//! concrete query can never carry the "all" wildcard:
//!
//! - [`Season`] - spring (`haru`) or autumn (`aki`)
//! - [`SeasonRange`] - a [`Season`] or `all`
//!
//! # Example
//!
//! ```
//! use kakomon_core::query::{AutumnPolicy, QueryRange, Season, SeasonRange};
//! use kakomon_core::random::SharedRng;
//!
//! let range = QueryRange::new(20, 25, 1, 80, SeasonRange::All);
//! let rng = SharedRng::seeded(7);
//! let query = range.sample(&rng, AutumnPolicy::default());
//! assert!((20..=25).contains(&query.year));
//! assert!(matches!(query.season, Season::Spring | Season::Autumn));
//! ```

mod error;

pub use error::ValidationError;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::random::SharedRng;

/// Accepted codes for a concrete season, for error messages.
const SEASON_CODES: &str = "haru, aki";

/// Accepted codes for a season constraint, for error messages.
const SEASON_RANGE_CODES: &str = "haru, aki, all";

/// Exam season of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    /// Spring sitting, URL code `haru`.
    #[serde(rename = "haru", alias = "spring")]
    Spring,
    /// Autumn sitting, URL code `aki`.
    #[serde(rename = "aki", alias = "autumn")]
    Autumn,
}

impl Season {
    /// Both concrete seasons, in draw order.
    pub const ALL: [Season; 2] = [Season::Spring, Season::Autumn];

    /// Code substituted into source URL templates.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Spring => "haru",
            Self::Autumn => "aki",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Season {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "haru" | "spring" => Ok(Self::Spring),
            "aki" | "autumn" => Ok(Self::Autumn),
            _ => Err(ValidationError::UnknownSeason {
                accepted: SEASON_CODES,
                got: s.to_string(),
            }),
        }
    }
}

/// Season constraint of a range: one concrete season, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SeasonRange {
    /// Spring only.
    #[serde(rename = "haru", alias = "spring")]
    Spring,
    /// Autumn only.
    #[serde(rename = "aki", alias = "autumn")]
    Autumn,
    /// Either season.
    #[default]
    #[serde(rename = "all")]
    All,
}

impl SeasonRange {
    /// Code used in configuration and query parameters.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Spring => "haru",
            Self::Autumn => "aki",
            Self::All => "all",
        }
    }

    /// The concrete season this constraint is fixed to, if any.
    #[must_use]
    pub fn fixed(self) -> Option<Season> {
        match self {
            Self::Spring => Some(Season::Spring),
            Self::Autumn => Some(Season::Autumn),
            Self::All => None,
        }
    }
}

impl From<Season> for SeasonRange {
    fn from(season: Season) -> Self {
        match season {
            Season::Spring => Self::Spring,
            Season::Autumn => Self::Autumn,
        }
    }
}

impl fmt::Display for SeasonRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SeasonRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Season>()
            .map(Self::from)
            .map_err(|_| ValidationError::UnknownSeason {
                accepted: SEASON_RANGE_CODES,
                got: s.to_string(),
            })
    }
}

/// One fully specified question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    /// Exam year (era year, as used by the archive URLs).
    pub year: u32,
    /// Exam season.
    pub season: Season,
    /// Question number.
    pub no: u32,
}

impl Query {
    /// Creates a query.
    #[must_use]
    pub fn new(year: u32, season: Season, no: u32) -> Self {
        Self { year, season, no }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{} q{}", self.year, self.season, self.no)
    }
}

/// Inclusive bounds and season constraint for random question selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QueryRange {
    /// Lowest year, inclusive.
    pub min_year: u32,
    /// Highest year, inclusive.
    pub max_year: u32,
    /// Lowest question number, inclusive.
    pub min_no: u32,
    /// Highest question number, inclusive.
    pub max_no: u32,
    /// Season constraint.
    #[serde(default)]
    pub season: SeasonRange,
}

impl QueryRange {
    /// Reserved value meaning "the owning source's own range".
    ///
    /// Recognized by equality only; an all-zero range is an ordinary
    /// (and for most sources invalid) range, not a request for the default.
    pub const SOURCE_MAX: QueryRange = QueryRange {
        min_year: 0,
        max_year: u32::MAX,
        min_no: 0,
        max_no: u32::MAX,
        season: SeasonRange::All,
    };

    /// Creates a range.
    #[must_use]
    pub const fn new(
        min_year: u32,
        max_year: u32,
        min_no: u32,
        max_no: u32,
        season: SeasonRange,
    ) -> Self {
        Self {
            min_year,
            max_year,
            min_no,
            max_no,
            season,
        }
    }

    /// Whether this is the [`SOURCE_MAX`](Self::SOURCE_MAX) sentinel.
    #[must_use]
    pub fn is_source_max(&self) -> bool {
        *self == Self::SOURCE_MAX
    }

    /// Checks `min <= max` for years and numbers.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvertedYears`] or
    /// [`ValidationError::InvertedNos`].
    pub fn check_order(&self) -> Result<(), ValidationError> {
        if self.max_year < self.min_year {
            return Err(ValidationError::InvertedYears {
                min: self.min_year,
                max: self.max_year,
            });
        }
        if self.max_no < self.min_no {
            return Err(ValidationError::InvertedNos {
                min: self.min_no,
                max: self.max_no,
            });
        }
        Ok(())
    }

    /// Draws a random query inside this range.
    ///
    /// Year and number are uniform over their inclusive bounds; the season is
    /// uniform over spring/autumn when the range allows both. All draws for
    /// one query happen under a single lock of `rng`.
    ///
    /// When `policy` reports the source's latest autumn as unpublished and
    /// the draw lands on that exact (year, autumn) pair, the year is redrawn
    /// from `[min_year, max_year - 1]`. A single-year range keeps its draw.
    ///
    /// Callers validate the range first; inverted bounds are drawn from as
    /// their ordered pair.
    #[must_use]
    pub fn sample(&self, rng: &SharedRng, policy: AutumnPolicy) -> Query {
        let (min_year, max_year) = ordered(self.min_year, self.max_year);
        let (min_no, max_no) = ordered(self.min_no, self.max_no);

        rng.with(|r| {
            let mut year = r.gen_range(min_year..=max_year);
            let no = r.gen_range(min_no..=max_no);
            let season = match self.season.fixed() {
                Some(season) => season,
                None => Season::ALL[r.gen_range(0..Season::ALL.len())],
            };
            if policy.excludes(year, season) && min_year < max_year {
                year = r.gen_range(min_year..max_year);
            }
            Query { year, season, no }
        })
    }
}

/// Whether the newest autumn sitting of a source can be served yet.
///
/// Built by [`Source::autumn_policy`](crate::source::Source::autumn_policy)
/// from the current date; the default excludes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutumnPolicy {
    /// The source's global maximum year.
    pub source_max_year: u32,
    /// True before the source's autumn publication cut-off.
    pub latest_autumn_unpublished: bool,
}

impl AutumnPolicy {
    /// Whether a drawn (year, season) pair must be redrawn.
    #[must_use]
    pub fn excludes(&self, year: u32, season: Season) -> bool {
        self.latest_autumn_unpublished
            && season == Season::Autumn
            && year == self.source_max_year
    }
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}
