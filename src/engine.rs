//! # Set Analysis Engine
//! Wires the pieces for one logged set: score → citation lookup → feedback.
//!
//! Scoring and composing are pure; the lookup is the only await point and is
//! routed through `lookup_or_empty`, so this never fails and always returns a
//! complete record.

use serde::{Deserialize, Serialize};

use crate::citations::{lookup_or_empty, CitationLookup, LookupOptions};
use crate::feedback::{compose_for_result, FeedbackResult};
use crate::scoring::{score_set, RawSetInput, ScoringResult};

/// Request body for analysing one set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub exercise: Option<String>,
    #[serde(flatten)]
    pub set: RawSetInput,
}

/// Scored set plus feedback, flattened into one record for the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise: Option<String>,
    #[serde(flatten)]
    pub score: ScoringResult,
    #[serde(flatten)]
    pub feedback: FeedbackResult,
}

impl SetAnalysis {
    pub fn citation_count(&self) -> usize {
        self.feedback
            .attribution
            .as_ref()
            .and_then(|a| a.citations.as_ref())
            .map_or(0, Vec::len)
    }
}

pub async fn analyze_set(
    lookup: &dyn CitationLookup,
    opts: &LookupOptions,
    req: SetRequest,
) -> SetAnalysis {
    let score = score_set(&req.set);
    let citations = lookup_or_empty(lookup, score.verdict, opts).await;
    let feedback = compose_for_result(&score, &citations);

    SetAnalysis {
        exercise: req
            .exercise
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()),
        score,
        feedback,
    }
}
