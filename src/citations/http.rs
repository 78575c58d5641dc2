// src/citations/http.rs
//! Remote corpus client: `GET {base_url}/citations?verdict=<tag>&limit=<n>`
//! returning a JSON array of `CitationRecord`.

use anyhow::{Context, Result};
use std::time::Duration;

use super::{CitationLookup, CitationRecord};
use crate::verdict::Verdict;

pub struct HttpCorpus {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCorpus {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sfr-set-analyzer/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout.min(Duration::from_secs(4)))
            .timeout(timeout)
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl CitationLookup for HttpCorpus {
    async fn lookup(&self, verdict: Verdict, limit: usize) -> Result<Vec<CitationRecord>> {
        let url = format!("{}/citations", self.base_url);
        let limit = limit.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[("verdict", verdict.as_str()), ("limit", limit.as_str())])
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()?;
        let records: Vec<CitationRecord> = resp.json().await.context("decoding citations")?;
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
