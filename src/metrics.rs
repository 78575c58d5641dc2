use anyhow::Result;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and describe the
    /// request-level series. Later calls reuse the same handle.
    pub fn init(citation_limit: usize) -> Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new().install_recorder()?;
                describe_counter!("sfr_sets_scored_total", "Sets scored, by verdict.");
                describe_counter!("sfr_feedback_total", "Feedback composed, by category.");
                describe_gauge!("sfr_citation_limit", "Configured citation limit per feedback.");
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();

        gauge!("sfr_citation_limit").set(citation_limit as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
