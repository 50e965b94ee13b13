use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Round identifier as captured from a post slug.
///
/// The literal digits are kept as-is so that `"7"` and `"007"` remain
/// distinct keys. Ordering is numeric, falling back to the raw string when
/// two identifiers denote the same number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundId(String);

impl RoundId {
    pub fn new(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares the numeric values without parsing, so arbitrarily long
    /// digit strings never overflow.
    pub fn numeric_cmp(&self, other: &Self) -> Ordering {
        let a = self.0.trim_start_matches('0');
        let b = other.0.trim_start_matches('0');
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }
}

impl Ord for RoundId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numeric_cmp(other).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for RoundId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tournament round post, alive only for the duration of a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentPost {
    pub round: RoundId,
    pub slug: String,
    pub title: String,
    pub content_html: String,
}
