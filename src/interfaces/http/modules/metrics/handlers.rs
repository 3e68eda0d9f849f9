//! Prometheus scrape endpoint
//!
//! Renders everything recorded through the `metrics` facade: the HTTP
//! counters from [`super::http_metrics_middleware`] and the calculation
//! counters `tax_calculations_total{outcome}` and `tax_charged_total{city}`.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// `GET /metrics`
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.handle.render(),
    )
}
