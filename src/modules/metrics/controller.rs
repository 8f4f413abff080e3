use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::services::metrics::MetricsRegistry;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// GET /metrics: poll, fetch, event and invalidation counters of the run
/// specs monitor in Prometheus text format.
pub async fn get_metrics(State(metrics): State<Arc<MetricsRegistry>>) -> Response {
    match metrics.export() {
        Ok(body) => ([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!("Metrics export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to export metrics: {}", e))
                .into_response()
        }
    }
}

/// GET /health: liveness of the monitor process.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
