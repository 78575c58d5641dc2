// src/config/app.rs
//! Service configuration: TOML file + env overrides + sanitizing.
//!
//! Lookup order for the file:
//! 1) $SFR_CONFIG_PATH (must exist)
//! 2) config/sfr.toml
//! 3) built-in defaults
//!
//! TOML shape:
//! ```toml
//! history_capacity = 500
//! debug_routes = false
//!
//! [citations]
//! provider = "static"           # static | http | disabled
//! corpus_path = "config/citations.json"
//! base_url = "https://corpus.example.org"
//! limit = 5
//! preview_chars = 200
//! timeout_ms = 1500
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::{info, warn};

pub const ENV_CONFIG_PATH: &str = "SFR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/sfr.toml";

pub const ENV_CITATION_PROVIDER: &str = "CITATION_PROVIDER";
pub const ENV_CITATION_BASE_URL: &str = "CITATION_BASE_URL";
pub const ENV_CITATION_LIMIT: &str = "CITATION_LIMIT";
pub const ENV_CITATION_CORPUS_PATH: &str = "CITATION_CORPUS_PATH";
pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";

const MAX_HISTORY_CAPACITY: usize = 10_000;

fn default_corpus_path() -> PathBuf {
    PathBuf::from("config/citations.json")
}
fn default_limit() -> usize {
    5
}
fn default_preview_chars() -> usize {
    200
}
fn default_timeout_ms() -> u64 {
    1500
}
fn default_history_capacity() -> usize {
    500
}

/// Which citation backend the service talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationProvider {
    #[default]
    Static,
    Http,
    Disabled,
}

impl std::str::FromStr for CitationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "http" => Ok(Self::Http),
            "disabled" | "off" | "none" => Ok(Self::Disabled),
            other => Err(anyhow!("unsupported citation provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationConfig {
    #[serde(default)]
    pub provider: CitationProvider,
    /// JSON corpus file for the `static` provider.
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,
    /// Root URL of the remote corpus service for the `http` provider.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Max records attached to one feedback (1..=20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Preview length of each record's text, ellipsis included (40..=1000).
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            provider: CitationProvider::default(),
            corpus_path: default_corpus_path(),
            base_url: None,
            limit: default_limit(),
            preview_chars: default_preview_chars(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub citations: CitationConfig,
    /// Entries kept by the in-memory analysis log.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Mounts `/metrics` and `/debug/*`.
    #[serde(default)]
    pub debug_routes: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            citations: CitationConfig::default(),
            history_capacity: default_history_capacity(),
            debug_routes: false,
        }
    }
}

impl AppConfig {
    /// Parse and sanitize TOML content (no env overrides).
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s).context("parsing sfr config TOML")?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load from an explicit file path (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolve the file via env + fallbacks, then apply env overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };

        cfg.apply_env_overrides();
        cfg.sanitize();
        info!(
            provider = ?cfg.citations.provider,
            limit = cfg.citations.limit,
            history_capacity = cfg.history_capacity,
            debug_routes = cfg.debug_routes,
            "sfr config loaded"
        );
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = env::var(ENV_CITATION_PROVIDER) {
            match raw.parse::<CitationProvider>() {
                Ok(p) => self.citations.provider = p,
                Err(e) => warn!(error = %e, "ignoring {ENV_CITATION_PROVIDER}"),
            }
        }
        if let Ok(url) = env::var(ENV_CITATION_BASE_URL) {
            let url = url.trim();
            if !url.is_empty() {
                self.citations.base_url = Some(url.to_string());
            }
        }
        if let Some(limit) = env::var(ENV_CITATION_LIMIT)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
        {
            self.citations.limit = limit;
        }
        if let Ok(p) = env::var(ENV_CITATION_CORPUS_PATH) {
            self.citations.corpus_path = PathBuf::from(p);
        }
        if let Ok(v) = env::var(ENV_DEBUG_ROUTES) {
            self.debug_routes = v == "1";
        }
    }

    fn sanitize(&mut self) {
        let c = &mut self.citations;
        c.limit = c.limit.clamp(1, 20);
        c.preview_chars = c.preview_chars.clamp(40, 1000);
        c.timeout_ms = c.timeout_ms.clamp(100, 30_000);
        if let Some(url) = c.base_url.as_mut() {
            while url.ends_with('/') {
                url.pop();
            }
        }
        self.history_capacity = self.history_capacity.min(MAX_HISTORY_CAPACITY);
    }
}
