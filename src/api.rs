use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use tower_http::cors::CorsLayer;

use crate::citations::{
    build_lookup, lookup_or_empty, CitationRecord, DynCitationLookup, LookupOptions,
};
use crate::config::AppConfig;
use crate::engine::{analyze_set, SetAnalysis, SetRequest};
use crate::feedback::{compose_feedback_for_tag, FeedbackResult};
use crate::history::{History, HistoryEntry};
use crate::metrics::Metrics;
use crate::scoring::{score_set, RawSetInput, ScoringResult};
use crate::summary::{summarize, SessionSummary};
use crate::verdict::Verdict;

const MAX_CITATION_LIMIT: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub lookup: DynCitationLookup,
    pub history: Arc<History>,
    pub opts: LookupOptions,
    pub debug_routes: bool,
}

impl AppState {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            lookup: build_lookup(&cfg.citations),
            history: Arc::new(History::with_capacity(cfg.history_capacity)),
            opts: LookupOptions::from(&cfg.citations),
            debug_routes: cfg.debug_routes,
        }
    }

    pub fn with_lookup(mut self, lookup: DynCitationLookup) -> Self {
        self.lookup = lookup;
        self
    }
}

pub fn router(state: AppState) -> Router {
    let debug = state.debug_routes;
    let limit = state.opts.limit;

    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/score", post(score))
        .route("/feedback", post(feedback))
        .route("/sets/analyze", post(analyze))
        .route("/sessions/summary", post(session_summary))
        .route("/citations", get(citations));

    if debug {
        app = app.route("/debug/history", get(debug_history));
    }

    let mut app = app.layer(CorsLayer::very_permissive()).with_state(state);

    if debug {
        match Metrics::init(limit) {
            Ok(m) => app = app.merge(m.router()),
            Err(e) => tracing::warn!(error = ?e, "metrics recorder unavailable"),
        }
    }
    app
}

async fn score(Json(raw): Json<RawSetInput>) -> Json<ScoringResult> {
    let r = score_set(&raw);
    counter!("sfr_sets_scored_total", "verdict" => r.verdict.as_str()).increment(1);
    Json(r)
}

#[derive(serde::Deserialize)]
struct FeedbackReq {
    verdict: String,
    #[serde(default)]
    citations: Vec<CitationRecord>,
}

async fn feedback(Json(body): Json<FeedbackReq>) -> Json<FeedbackResult> {
    let fb = compose_feedback_for_tag(&body.verdict, &body.citations);
    counter!("sfr_feedback_total", "category" => fb.feedback_category.as_str()).increment(1);
    Json(fb)
}

async fn analyze(State(state): State<AppState>, Json(req): Json<SetRequest>) -> Json<SetAnalysis> {
    let a = analyze_set(state.lookup.as_ref(), &state.opts, req).await;

    counter!("sfr_sets_scored_total", "verdict" => a.score.verdict.as_str()).increment(1);
    counter!("sfr_feedback_total", "category" => a.feedback.feedback_category.as_str())
        .increment(1);
    state.history.push(
        a.exercise.as_deref(),
        &a.score,
        a.feedback.feedback_category,
        a.citation_count(),
    );
    tracing::debug!(verdict = %a.score.verdict, ratio = a.score.ratio, "set analyzed");

    Json(a)
}

async fn session_summary(Json(sets): Json<Vec<RawSetInput>>) -> Json<SessionSummary> {
    Json(summarize(&sets))
}

#[derive(serde::Deserialize)]
struct CitationsQuery {
    verdict: String,
    #[serde(default)]
    limit: Option<usize>,
}

async fn citations(
    State(state): State<AppState>,
    Query(q): Query<CitationsQuery>,
) -> Result<Json<Vec<CitationRecord>>, (StatusCode, String)> {
    let verdict: Verdict = q
        .verdict
        .parse()
        .map_err(|e: crate::verdict::UnknownVerdict| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let opts = LookupOptions {
        limit: q.limit.unwrap_or(state.opts.limit).clamp(1, MAX_CITATION_LIMIT),
        ..state.opts
    };
    Ok(Json(lookup_or_empty(state.lookup.as_ref(), verdict, &opts).await))
}

#[derive(serde::Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    n: Option<usize>,
}

async fn debug_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(q.n.unwrap_or(10)))
}
