// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod citations;
pub mod config;
pub mod engine;
pub mod feedback;
pub mod history;
pub mod metrics;
pub mod scoring;
pub mod summary;
pub mod verdict;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::citations::{CitationLookup, CitationRecord};
pub use crate::feedback::{
    compose_feedback, compose_feedback_for_tag, compose_for_result, Attribution, FeedbackResult,
};
pub use crate::scoring::{breakdown, score_set, RawSetInput, ScoringResult};
pub use crate::verdict::{FeedbackCategory, Verdict};

use axum::Router;
use tracing::info;

/// Build the full application router from env/config files.
///
/// Used by the Shuttle entrypoint and by integration tests that want the
/// same wiring as production.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = config::AppConfig::load_default()?;
    let state = AppState::from_config(&cfg);
    info!(provider = state.lookup.name(), "sfr router ready");
    Ok(router(state))
}
