use std::sync::Arc;
use std::time::Duration;

use super::MetricsRegistry;

/// Poll tick outcome labels
pub mod outcome {
    pub const SKIPPED: &str = "skipped";
    pub const NO_PROJECT: &str = "no_project";
    pub const FETCHED: &str = "fetched";
    pub const NOT_FOUND: &str = "not_found";
    pub const ERROR: &str = "error";
}

/// Collector for monitor metrics
#[derive(Clone)]
pub struct MonitorMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl MonitorMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn record_poll(&self, outcome: &str) {
        self.metrics.polls_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_fetch(&self, duration: Duration) {
        self.metrics
            .fetch_duration_seconds
            .observe(duration.as_secs_f64());
    }

    pub fn record_fetch_error(&self, kind: &str) {
        self.metrics
            .fetch_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn record_event(&self, event: &str) {
        self.metrics
            .events_emitted_total
            .with_label_values(&[event])
            .inc();
    }

    pub fn record_invalidation(&self, success: bool) {
        let result = if success { "ok" } else { "error" };
        self.metrics
            .cache_invalidations_total
            .with_label_values(&[result])
            .inc();
    }

    pub fn set_poll_interval(&self, interval: Duration) {
        self.metrics
            .poll_interval_seconds
            .set(interval.as_secs_f64());
    }
}
