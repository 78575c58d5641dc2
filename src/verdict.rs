//! verdict.rs — closed tags for the scoring verdict and the feedback category.
//!
//! Both travel over the wire as lowercase strings exactly as named here; any
//! other string is rejected by `FromStr` / serde.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Efficiency tier of a single set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Great,
    Good,
    Meh,
    Costly,
    /// Warm-up or degenerate input, excluded from stimulus/fatigue accounting.
    Ignored,
}

impl Verdict {
    pub const ALL: [Verdict; 5] = [
        Verdict::Great,
        Verdict::Good,
        Verdict::Meh,
        Verdict::Costly,
        Verdict::Ignored,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Great => "great",
            Verdict::Good => "good",
            Verdict::Meh => "meh",
            Verdict::Costly => "costly",
            Verdict::Ignored => "ignored",
        }
    }

    /// Category shown to the user for this verdict.
    pub fn category(self) -> FeedbackCategory {
        match self {
            Verdict::Great => FeedbackCategory::Excellent,
            Verdict::Good => FeedbackCategory::Good,
            Verdict::Meh => FeedbackCategory::Moderate,
            Verdict::Costly => FeedbackCategory::Suboptimal,
            Verdict::Ignored => FeedbackCategory::Warmup,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a verdict tag is not one of the five known names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVerdict(pub String);

impl fmt::Display for UnknownVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown verdict '{}'", self.0)
    }
}

impl std::error::Error for UnknownVerdict {}

impl FromStr for Verdict {
    type Err = UnknownVerdict;

    /// Exact lowercase match only; the wire format has no aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verdict::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVerdict(s.to_string()))
    }
}

/// Category attached to composed feedback (drives UI colouring).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    Excellent,
    Good,
    Moderate,
    Suboptimal,
    Warmup,
    Error,
}

impl FeedbackCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackCategory::Excellent => "excellent",
            FeedbackCategory::Good => "good",
            FeedbackCategory::Moderate => "moderate",
            FeedbackCategory::Suboptimal => "suboptimal",
            FeedbackCategory::Warmup => "warmup",
            FeedbackCategory::Error => "error",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
