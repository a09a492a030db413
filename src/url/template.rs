//! Precompiled source URL templates.
//!
//! Templates use the archive configuration syntax, e.g.
//! `http://www.fe-siken.com/kakomon/{{.Year}}_{{.Season}}/q{{.No}}.html`.
//! Placeholders may carry inner whitespace (`{{ .Year }}`). Anything else
//! between `{{` and `}}` is rejected when the template is compiled.

use crate::error::ConfigError;
use crate::query::Query;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Year,
    Season,
    No,
}

/// A URL template split into literal text and placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl UrlTemplate {
    /// Compiles a template string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTemplate`] for an unclosed `{{` or an
    /// unknown placeholder.
    pub fn compile(template: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let Some(close) = after_open.find("}}") else {
                return Err(ConfigError::invalid_template(template, "unclosed '{{'"));
            };
            let segment = match after_open[..close].trim() {
                ".Year" => Segment::Year,
                ".Season" => Segment::Season,
                ".No" => Segment::No,
                other => {
                    return Err(ConfigError::invalid_template(
                        template,
                        format!("unknown placeholder '{other}'"),
                    ));
                }
            };
            segments.push(segment);
            rest = &after_open[close + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template text this was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitutes a query into the template.
    #[must_use]
    pub fn render(&self, query: &Query) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Year => out.push_str(&query.year.to_string()),
                Segment::Season => out.push_str(query.season.code()),
                Segment::No => out.push_str(&query.no.to_string()),
            }
        }
        out
    }
}
