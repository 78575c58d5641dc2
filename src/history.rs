//! history.rs — bounded in-memory log of recent set analyses (diagnostics only).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

use crate::scoring::ScoringResult;
use crate::verdict::{FeedbackCategory, Verdict};

const HARD_CAP: usize = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub recorded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise: Option<String>,
    pub verdict: Verdict,
    pub ratio: f64,
    pub category: FeedbackCategory,
    /// Number of citation records attached to the feedback.
    pub citations: usize,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.min(HARD_CAP);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    pub fn push(
        &self,
        exercise: Option<&str>,
        score: &ScoringResult,
        category: FeedbackCategory,
        citations: usize,
    ) {
        if self.cap == 0 {
            return;
        }
        let entry = HistoryEntry {
            recorded_at: Utc::now(),
            exercise: exercise.map(str::to_string),
            verdict: score.verdict,
            ratio: score.ratio,
            category,
            citations,
        };

        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
