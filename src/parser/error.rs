//! Error types for question page parsing.

use std::fmt;

use thiserror::Error;

/// Structural landmarks a question page must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Block after the question number heading.
    Question,
    /// List of answer choices.
    Selections,
    /// Answer box with its correct-choice marker.
    Answer,
    /// Explanation block after the answer box.
    Explanation,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Question => "question block",
            Self::Selections => "selection list",
            Self::Answer => "answer marker",
            Self::Explanation => "explanation block",
        })
    }
}

/// A page that does not have the expected question layout.
///
/// Usually the archive changed its markup, or the fetch landed on an error
/// or redirect page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A required landmark is absent.
    #[error("page layout not recognized: missing {0}")]
    MissingAnchor(Anchor),
}
