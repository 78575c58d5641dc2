//! # Feedback Composer
//! Turns a verdict (plus an optional, already-ranked list of citation records)
//! into user-facing text, a category, and an attribution block.
//!
//! Attribution has two tiers:
//! - records supplied → dynamic text with the record count, URLs in input order,
//!   and the records echoed back for the UI;
//! - no records → fixed per-verdict statement with two study links.
//!
//! No I/O here; the citation lookup is the caller's job (see `crate::citations`).

use serde::{Deserialize, Serialize};

use crate::citations::CitationRecord;
use crate::scoring::ScoringResult;
use crate::verdict::{FeedbackCategory, Verdict};

/// Attribution block shown under the feedback text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub text: String,
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<CitationRecord>>,
}

/// Complete feedback for one set. Always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResult {
    pub feedback: String,
    pub feedback_category: FeedbackCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Attribution>,
}

const STUDY_PMC_8126497: &str = "https://pmc.ncbi.nlm.nih.gov/articles/PMC8126497/";
const STUDY_FRONTIERS_2022: &str =
    "https://www.frontiersin.org/journals/sports-and-active-living/articles/10.3389/fspor.2022.949021/full";
const STUDY_SPORTS_MED_OPEN_2023: &str =
    "https://sportsmedicine-open.springeropen.com/articles/10.1186/s40798-023-00554-y";
const STUDY_PUBMED_27038416: &str = "https://pubmed.ncbi.nlm.nih.gov/27038416/";
const STUDY_MDPI_2024: &str = "https://www.mdpi.com/2411-5142/9/4/186";

const ERROR_FEEDBACK: &str = "Unable to evaluate this set.";
const GENERIC_ATTRIBUTION: &str =
    "General resistance-training guidance on stimulus and fatigue management.";

fn feedback_text(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Great => "🔥 Excellent stimulus with minimal fatigue!",
        Verdict::Good => "✅ Good balance of stimulus and fatigue. This set was effective.",
        Verdict::Meh => {
            "⚠️ Moderate stimulus-to-fatigue ratio. Try a heavier load or finish closer to failure."
        }
        Verdict::Costly => {
            "💪 Fatigue outweighs stimulus. Consider adding load or leaving fewer reps in reserve."
        }
        Verdict::Ignored => {
            "🧊 Warm-up set: excluded from stimulus and fatigue tracking for your working sets."
        }
    }
}

/// Research theme a verdict's citations are grouped under.
fn theme(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Great => "high-efficiency training",
        Verdict::Good => "effective training volume",
        Verdict::Meh => "proximity-to-failure",
        Verdict::Costly => "fatigue management",
        Verdict::Ignored => "warm-up",
    }
}

/// Hard-coded attribution used when no corpus records were supplied.
fn static_attribution(verdict: Verdict) -> Attribution {
    let (text, urls): (&str, [&str; 2]) = match verdict {
        Verdict::Great => (
            "Training close to failure with moderate-to-heavy loads maximizes hypertrophic stimulus per unit of fatigue.",
            [STUDY_PMC_8126497, STUDY_SPORTS_MED_OPEN_2023],
        ),
        Verdict::Good => (
            "Sets taken within a few reps of failure produce comparable growth with manageable recovery cost.",
            [STUDY_FRONTIERS_2022, STUDY_PMC_8126497],
        ),
        Verdict::Meh => (
            "Stimulus rises sharply as sets approach failure; stopping far from failure leaves growth on the table.",
            [STUDY_SPORTS_MED_OPEN_2023, STUDY_PUBMED_27038416],
        ),
        Verdict::Costly => (
            "High-rep sets far from failure or with light loads accumulate fatigue faster than they build stimulus.",
            [STUDY_PUBMED_27038416, STUDY_MDPI_2024],
        ),
        Verdict::Ignored => (
            "Warm-up sets prepare the tissue and nervous system but contribute little direct hypertrophic stimulus.",
            [STUDY_MDPI_2024, STUDY_FRONTIERS_2022],
        ),
    };
    Attribution {
        text: text.to_string(),
        urls: urls.iter().map(|u| u.to_string()).collect(),
        citations: None,
    }
}

fn dynamic_attribution(verdict: Verdict, citations: &[CitationRecord]) -> Attribution {
    let n = citations.len();
    let noun = if n == 1 { "finding" } else { "findings" };
    Attribution {
        text: format!(
            "Found {n} relevant {} {noun} in the research corpus.",
            theme(verdict)
        ),
        urls: citations.iter().map(|c| c.url.clone()).collect(),
        citations: Some(citations.to_vec()),
    }
}

fn generic_attribution() -> Attribution {
    Attribution {
        text: GENERIC_ATTRIBUTION.to_string(),
        urls: vec![STUDY_PMC_8126497.to_string()],
        citations: None,
    }
}

/// Compose feedback for a typed verdict.
pub fn compose_feedback(verdict: Verdict, citations: &[CitationRecord]) -> FeedbackResult {
    let attribution = if citations.is_empty() {
        static_attribution(verdict)
    } else {
        dynamic_attribution(verdict, citations)
    };

    FeedbackResult {
        feedback: feedback_text(verdict).to_string(),
        feedback_category: verdict.category(),
        attribution: Some(attribution),
    }
}

/// Convenience wrapper taking the engine's output directly.
pub fn compose_for_result(result: &ScoringResult, citations: &[CitationRecord]) -> FeedbackResult {
    compose_feedback(result.verdict, citations)
}

/// Compose feedback for a verdict tag coming from outside the engine.
/// Unknown tags yield the `error` category with a generic attribution.
pub fn compose_feedback_for_tag(tag: &str, citations: &[CitationRecord]) -> FeedbackResult {
    match tag.parse::<Verdict>() {
        Ok(v) => compose_feedback(v, citations),
        Err(_) => FeedbackResult {
            feedback: ERROR_FEEDBACK.to_string(),
            feedback_category: FeedbackCategory::Error,
            attribution: Some(generic_attribution()),
        },
    }
}
