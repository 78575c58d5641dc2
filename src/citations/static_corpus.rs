// src/citations/static_corpus.rs
//! File-backed corpus of study snippets, each tagged with the verdicts it supports.
//!
//! JSON shape:
//! [
//!   { "text": "...", "url": "https://...", "metadata": { "title": "..." },
//!     "verdicts": ["great", "good"] }
//! ]

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::{CitationLookup, CitationRecord};
use crate::verdict::Verdict;

#[derive(Debug, Clone, Deserialize)]
struct CorpusEntry {
    #[serde(flatten)]
    record: CitationRecord,
    #[serde(default)]
    verdicts: Vec<Verdict>,
}

#[derive(Debug, Clone, Default)]
pub struct StaticCorpus {
    entries: Vec<CorpusEntry>,
}

impl StaticCorpus {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading citation corpus from {}", path.display()))?;
        Self::from_json_str(&data)
            .with_context(|| format!("parsing citation corpus {}", path.display()))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let entries: Vec<CorpusEntry> = serde_json::from_str(s)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records tagged with `verdict`, in file order.
    pub fn matching(&self, verdict: Verdict) -> impl Iterator<Item = &CitationRecord> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.verdicts.contains(&verdict))
            .map(|e| &e.record)
    }
}

#[async_trait::async_trait]
impl CitationLookup for StaticCorpus {
    /// First `limit` records with distinct URLs; a repeated URL never takes a slot.
    async fn lookup(&self, verdict: Verdict, limit: usize) -> Result<Vec<CitationRecord>> {
        let mut seen: HashSet<&str> = HashSet::new();
        Ok(self
            .matching(verdict)
            .filter(|&r| seen.insert(r.url.trim()))
            .take(limit)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
