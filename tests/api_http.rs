// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET  /health
// - POST /score
// - POST /feedback
// - POST /sets/analyze
// - POST /sessions/summary
// - GET  /citations

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use sfr_set_analyzer::citations::{DisabledLookup, StaticCorpus};
use sfr_set_analyzer::config::{AppConfig, CitationProvider};
use sfr_set_analyzer::{router, AppState};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

const CORPUS: &str = r#"[
    {"text": "Costly sets &amp; fatigue", "url": "https://study/1", "verdicts": ["costly"]},
    {"text": "More on fatigue", "url": "https://study/2", "verdicts": ["costly", "meh"]},
    {"text": "Dup of first", "url": "https://study/1", "verdicts": ["costly"]}
]"#;

fn base_state() -> AppState {
    let cfg = AppConfig {
        citations: sfr_set_analyzer::config::CitationConfig {
            provider: CitationProvider::Disabled,
            ..Default::default()
        },
        ..AppConfig::default()
    };
    AppState::from_config(&cfg)
}

fn corpus_router() -> Router {
    let corpus = StaticCorpus::from_json_str(CORPUS).expect("corpus");
    router(base_state().with_lookup(Arc::new(corpus)))
}

fn bare_router() -> Router {
    router(base_state().with_lookup(Arc::new(DisabledLookup)))
}

async fn post_json(app: Router, uri: &str, payload: Json) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    (status, String::from_utf8(bytes.to_vec()).expect("utf8"))
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let (status, body) = get(bare_router(), "/health").await;
    assert_eq!(status, StatusCode::OK, "health should be 200");
    assert_eq!(body.trim(), "OK");
}

#[tokio::test]
async fn api_score_returns_result_shape() {
    let (status, v) = post_json(
        bare_router(),
        "/score",
        json!({ "load": 100, "reps": 8, "rir": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["verdict"], json!("meh"));
    assert_eq!(v["stimulus"], json!(3.0));
    let ratio = v["ratio"].as_f64().expect("ratio number");
    assert!((ratio - 0.49).abs() < 1e-9, "ratio {ratio}");
}

#[tokio::test]
async fn api_score_treats_missing_and_degenerate_input_as_ignored() {
    let (status, v) = post_json(bare_router(), "/score", json!({ "reps": 8, "rir": 2 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        v,
        json!({ "ratio": 0.0, "stimulus": 0.0, "fatigue": 0.0, "verdict": "ignored" })
    );
}

#[tokio::test]
async fn api_null_fields_behave_like_absent_ones() {
    let (status, v) = post_json(
        bare_router(),
        "/score",
        json!({ "load": null, "reps": 8, "rir": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["verdict"], json!("ignored"));

    // null rir reads as 0: 100 x 5 @ 0 is a great set.
    let (status, v) = post_json(
        bare_router(),
        "/sets/analyze",
        json!({ "exercise": "Squat", "load": 100, "reps": 5, "rir": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["verdict"], json!("great"));
}

#[tokio::test]
async fn api_feedback_handles_known_and_unknown_tags() {
    let (status, v) = post_json(bare_router(), "/feedback", json!({ "verdict": "great" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["feedbackCategory"], json!("excellent"));
    assert_eq!(v["attribution"]["urls"].as_array().unwrap().len(), 2);
    assert!(v["attribution"].get("citations").is_none());

    let (status, v) = post_json(bare_router(), "/feedback", json!({ "verdict": "legendary" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["feedbackCategory"], json!("error"));
    assert!(v["feedback"].as_str().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn api_feedback_echoes_supplied_citations() {
    let cites = json!([
        { "text": "first", "url": "https://a/1" },
        { "text": "second", "url": "https://a/2", "metadata": { "year": 2023 } }
    ]);
    let (status, v) = post_json(
        bare_router(),
        "/feedback",
        json!({ "verdict": "costly", "citations": cites }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["feedbackCategory"], json!("suboptimal"));
    let a = &v["attribution"];
    assert!(a["text"].as_str().unwrap().contains("2 relevant"));
    assert_eq!(a["urls"], json!(["https://a/1", "https://a/2"]));
    assert_eq!(a["citations"], cites);
}

#[tokio::test]
async fn api_analyze_attaches_prepared_citations() {
    // 8 reps @ rir 6 -> zero effective reps -> costly
    let (status, v) = post_json(
        corpus_router(),
        "/sets/analyze",
        json!({ "exercise": "Leg press", "load": 150, "reps": 8, "rir": 6 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["exercise"], json!("Leg press"));
    assert_eq!(v["verdict"], json!("costly"));
    assert_eq!(v["feedbackCategory"], json!("suboptimal"));

    let a = &v["attribution"];
    assert_eq!(a["urls"], json!(["https://study/1", "https://study/2"]));
    let cites = a["citations"].as_array().unwrap();
    assert_eq!(cites.len(), 2);
    assert_eq!(cites[0]["text"], json!("Costly sets & fatigue"));
}

#[tokio::test]
async fn api_analyze_without_corpus_falls_back_to_static() {
    let (status, v) = post_json(
        bare_router(),
        "/sets/analyze",
        json!({ "load": 60, "reps": 2, "rir": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["verdict"], json!("ignored"));
    assert_eq!(v["feedbackCategory"], json!("warmup"));
    assert!(v.get("exercise").is_none());
    assert!(v["attribution"].get("citations").is_none());
}

#[tokio::test]
async fn api_session_summary_counts_verdicts() {
    let sets = json!([
        { "load": 60, "reps": 2, "rir": 5 },
        { "load": 100, "reps": 8, "rir": 2 },
        { "load": 80, "reps": 5, "rir": 0 }
    ]);
    let (status, v) = post_json(bare_router(), "/sessions/summary", sets).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["totalSets"], json!(3));
    assert_eq!(v["workingSets"], json!(2));
    assert_eq!(v["verdicts"]["ignored"], json!(1));
    assert_eq!(v["verdicts"]["meh"], json!(1));
    assert_eq!(v["verdicts"]["great"], json!(1));
}

#[tokio::test]
async fn api_citations_lookup_and_bad_verdict() {
    let (status, body) = get(corpus_router(), "/citations?verdict=costly&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_str(&body).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 1);
    assert_eq!(v[0]["url"], json!("https://study/1"));

    let (status, body) = get(corpus_router(), "/citations?verdict=awesome").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("awesome"));
}

#[tokio::test]
async fn api_debug_routes_are_hidden_by_default() {
    let (status, _) = get(bare_router(), "/debug/history").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
