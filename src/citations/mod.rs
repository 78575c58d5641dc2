// src/citations/mod.rs
//! Citation lookup: the contract the feedback path depends on, plus backends.
//!
//! `lookup(verdict, limit)` returns ordered records for a verdict. Whatever the
//! backend returns, [`lookup_or_empty`] enforces the output contract:
//! deduplicated by URL (first wins), text normalized and cut to a bounded
//! preview, at most `limit` records. Failures and timeouts degrade to an
//! empty list so feedback falls back to its static attribution.

pub mod http;
pub mod static_corpus;

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{CitationConfig, CitationProvider};
use crate::verdict::Verdict;

pub use http::HttpCorpus;
pub use static_corpus::StaticCorpus;

/// One supporting-evidence snippet owned by the external corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationRecord {
    pub text: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[async_trait::async_trait]
pub trait CitationLookup: Send + Sync {
    async fn lookup(&self, verdict: Verdict, limit: usize) -> Result<Vec<CitationRecord>>;
    fn name(&self) -> &'static str;
}

pub type DynCitationLookup = Arc<dyn CitationLookup>;

/// Backend used when citations are switched off or misconfigured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLookup;

#[async_trait::async_trait]
impl CitationLookup for DisabledLookup {
    async fn lookup(&self, _verdict: Verdict, _limit: usize) -> Result<Vec<CitationRecord>> {
        Ok(Vec::new())
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Knobs applied on top of any backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    pub limit: usize,
    pub preview_chars: usize,
    pub timeout: Duration,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self::from(&CitationConfig::default())
    }
}

impl From<&CitationConfig> for LookupOptions {
    fn from(c: &CitationConfig) -> Self {
        Self {
            limit: c.limit,
            preview_chars: c.preview_chars,
            timeout: Duration::from_millis(c.timeout_ms),
        }
    }
}

/// Build the configured backend. Misconfiguration logs a warning and falls
/// back to [`DisabledLookup`] instead of failing startup.
pub fn build_lookup(cfg: &CitationConfig) -> DynCitationLookup {
    match cfg.provider {
        CitationProvider::Disabled => Arc::new(DisabledLookup),
        CitationProvider::Static => match StaticCorpus::from_path(&cfg.corpus_path) {
            Ok(corpus) => {
                tracing::info!(
                    path = %cfg.corpus_path.display(),
                    records = corpus.len(),
                    "static citation corpus loaded"
                );
                Arc::new(corpus)
            }
            Err(e) => {
                tracing::warn!(error = ?e, "static corpus unavailable; citations disabled");
                Arc::new(DisabledLookup)
            }
        },
        CitationProvider::Http => match cfg.base_url.as_deref() {
            Some(url) => match HttpCorpus::new(url, Duration::from_millis(cfg.timeout_ms)) {
                Ok(c) => Arc::new(c),
                Err(e) => {
                    tracing::warn!(error = ?e, "http corpus client failed; citations disabled");
                    Arc::new(DisabledLookup)
                }
            },
            None => {
                tracing::warn!("citation provider 'http' without base_url; citations disabled");
                Arc::new(DisabledLookup)
            }
        },
    }
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "sfr_citation_lookup_errors_total",
            "Citation lookups that failed or timed out."
        );
        describe_counter!(
            "sfr_citation_fallback_total",
            "Lookups that produced no records (static attribution used)."
        );
        describe_histogram!("sfr_citation_lookup_ms", "Citation lookup time in milliseconds.");
    });
}

/// Backends are asked for this many times `limit` so that records dropped by
/// [`prepare_citations`] (repeated URLs, empty text) don't leave the result short.
const OVERFETCH_FACTOR: usize = 2;

/// Query `lookup` and enforce the output contract; never fails.
pub async fn lookup_or_empty(
    lookup: &dyn CitationLookup,
    verdict: Verdict,
    opts: &LookupOptions,
) -> Vec<CitationRecord> {
    ensure_metrics_described();

    let fetch = opts.limit.saturating_mul(OVERFETCH_FACTOR);
    let started = Instant::now();
    let raw = match tokio::time::timeout(opts.timeout, lookup.lookup(verdict, fetch)).await {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => {
            tracing::warn!(error = ?e, provider = lookup.name(), %verdict, "citation lookup failed");
            counter!("sfr_citation_lookup_errors_total", "provider" => lookup.name()).increment(1);
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(
                provider = lookup.name(),
                %verdict,
                timeout_ms = opts.timeout.as_millis() as u64,
                "citation lookup timed out"
            );
            counter!("sfr_citation_lookup_errors_total", "provider" => lookup.name()).increment(1);
            Vec::new()
        }
    };
    histogram!("sfr_citation_lookup_ms").record(started.elapsed().as_secs_f64() * 1000.0);

    let out = prepare_citations(raw, opts.limit, opts.preview_chars);
    if out.is_empty() {
        counter!("sfr_citation_fallback_total").increment(1);
    }
    tracing::debug!(provider = lookup.name(), %verdict, count = out.len(), "citations prepared");
    out
}

/// Dedup by URL (first occurrence wins), normalize preview text, keep `limit`.
/// Records with an empty URL or empty text after normalization are dropped.
pub fn prepare_citations(
    records: Vec<CitationRecord>,
    limit: usize,
    preview_chars: usize,
) -> Vec<CitationRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(limit.min(records.len()));

    for mut rec in records {
        if out.len() >= limit {
            break;
        }
        let url = rec.url.trim().to_string();
        if url.is_empty() || !seen.insert(url.clone()) {
            continue;
        }
        rec.url = url;
        rec.text = preview_text(&rec.text, preview_chars);
        if rec.text.is_empty() {
            continue;
        }
        out.push(rec);
    }
    out
}

/// Normalize scraped snippet text and cut it to `max_chars` characters
/// (ellipsis included when truncated).
pub fn preview_text(s: &str, max_chars: usize) -> String {
    // 1) Strip HTML tags (before decoding, so `&lt;` stays text)
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    let mut out = re_tags.replace_all(s, "").to_string();

    // 2) Markdown links `[label](url)` -> `label`
    static RE_MD_LINK: OnceCell<regex::Regex> = OnceCell::new();
    let re_md = RE_MD_LINK.get_or_init(|| regex::Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
    out = re_md.replace_all(&out, "$1").to_string();

    // 3) HTML entity decode
    out = html_escape::decode_html_entities(&out).to_string();

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap
    if max_chars > 0 && out.chars().count() > max_chars {
        let mut cut: String = out.chars().take(max_chars - 1).collect();
        cut.truncate(cut.trim_end().len());
        cut.push('…');
        out = cut;
    }
    out
}
