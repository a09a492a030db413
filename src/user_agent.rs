//! User-Agent string sent to question archives.
//!
//! Identifies the tool and its version so archive operators can tell who is
//! reading their pages (RFC 9308).

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/kakomon";

/// Default User-Agent for archive requests.
#[must_use]
pub(crate) fn default_fetch_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("kakomon/{version} (exam-study-tool; +{PROJECT_UA_URL})")
}
