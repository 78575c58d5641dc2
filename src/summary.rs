//! Session summary: aggregate several scored sets into one efficiency picture.
//!
//! Totals are built from the unrounded per-set values; only the output is
//! rounded. Warm-ups count toward `total_sets` and `verdicts.ignored` only.

use serde::{Deserialize, Serialize};

use crate::scoring::{breakdown, classify_ratio, round2, RawSetInput};
use crate::verdict::Verdict;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub great: usize,
    pub good: usize,
    pub meh: usize,
    pub costly: usize,
    pub ignored: usize,
}

impl VerdictCounts {
    fn bump(&mut self, v: Verdict) {
        match v {
            Verdict::Great => self.great += 1,
            Verdict::Good => self.good += 1,
            Verdict::Meh => self.meh += 1,
            Verdict::Costly => self.costly += 1,
            Verdict::Ignored => self.ignored += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_sets: usize,
    pub working_sets: usize,
    pub verdicts: VerdictCounts,
    pub total_stimulus: f64,
    pub total_fatigue: f64,
    /// total stimulus / total fatigue (0 when no fatigue).
    pub session_ratio: f64,
    /// Mean of per-set ratios over working sets.
    pub mean_ratio: f64,
    pub session_verdict: Verdict,
}

pub fn summarize(sets: &[RawSetInput]) -> SessionSummary {
    let mut counts = VerdictCounts::default();
    let mut working = 0usize;
    let mut stim = 0.0f64;
    let mut fat = 0.0f64;
    let mut ratio_sum = 0.0f64;

    for b in sets.iter().map(breakdown) {
        counts.bump(b.verdict);
        if b.verdict == Verdict::Ignored {
            continue;
        }
        working += 1;
        stim += b.stimulus;
        fat += b.fatigue;
        ratio_sum += b.ratio;
    }

    let session_ratio = if fat > 0.0 { stim / fat } else { 0.0 };
    let mean_ratio = if working > 0 {
        ratio_sum / working as f64
    } else {
        0.0
    };
    let session_verdict = if working == 0 {
        Verdict::Ignored
    } else {
        classify_ratio(session_ratio)
    };

    SessionSummary {
        total_sets: sets.len(),
        working_sets: working,
        verdicts: counts,
        total_stimulus: round2(stim),
        total_fatigue: round2(fat),
        session_ratio: round2(session_ratio),
        mean_ratio: round2(mean_ratio),
        session_verdict,
    }
}
