//! The structured question record returned to callers.

use serde::{Deserialize, Serialize};

/// Version of the [`Response`] JSON layout.
pub const JSON_VERSION: &str = "1.0.0";

/// One parsed exam question with its answer.
///
/// Serializes as
/// `{question, selections, answer, explanation, hasImage, url, version}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Question body text.
    pub question: String,

    /// Choices in page order, each formatted as `"<label>: <text>"`.
    pub selections: Vec<String>,

    /// Label of the correct choice.
    pub answer: String,

    /// Explanation text.
    pub explanation: String,

    /// True when the question, choices or answer contain an image, so the
    /// text alone does not carry the full question.
    pub has_image: bool,

    /// Page the record was parsed from; empty for offline parses.
    pub url: String,

    /// Layout version, always [`JSON_VERSION`].
    pub version: String,
}

impl Response {
    /// Returns the record tagged with the page it came from.
    #[must_use]
    pub fn with_url(self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_uses_camel_case_keys() {
        let res = Response {
            question: "q".to_string(),
            selections: vec!["ア: one".to_string()],
            answer: "ア".to_string(),
            explanation: "e".to_string(),
            has_image: true,
            url: "http://example.com/q1.html".to_string(),
            version: JSON_VERSION.to_string(),
        };
        let value = serde_json::to_value(&res).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        for key in [
            "question",
            "selections",
            "answer",
            "explanation",
            "hasImage",
            "url",
            "version",
        ] {
            assert!(keys.contains(&key), "missing key {key} in {keys:?}");
        }
        assert_eq!(value["hasImage"], serde_json::json!(true));
    }

    #[test]
    fn test_with_url_keeps_content() {
        let res = Response {
            question: "q".to_string(),
            ..Response::default()
        }
        .with_url("http://example.com/");
        assert_eq!(res.question, "q");
        assert_eq!(res.url, "http://example.com/");
    }
}
