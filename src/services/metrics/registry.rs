use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

const NAMESPACE: &str = "relevant_runs";

/// Metrics registry for the run specs monitor
pub struct MetricsRegistry {
    registry: Registry,

    // Poll metrics
    pub polls_total: CounterVec,
    pub fetch_errors_total: CounterVec,
    pub fetch_duration_seconds: Histogram,
    pub poll_interval_seconds: Gauge,

    // Dispatch metrics
    pub events_emitted_total: CounterVec,
    pub cache_invalidations_total: CounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let polls_total = CounterVec::new(
            Opts::new("polls_total", "Poll ticks by outcome").namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(polls_total.clone()))?;

        let fetch_errors_total = CounterVec::new(
            Opts::new("fetch_errors_total", "Failed run specs queries by error kind")
                .namespace(NAMESPACE),
            &["kind"],
        )?;
        registry.register(Box::new(fetch_errors_total.clone()))?;

        let fetch_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("fetch_duration_seconds", "Run specs query duration")
                .namespace(NAMESPACE)
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(fetch_duration_seconds.clone()))?;

        let poll_interval_seconds = Gauge::with_opts(
            Opts::new("poll_interval_seconds", "Current delay between poll ticks")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(poll_interval_seconds.clone()))?;

        let events_emitted_total = CounterVec::new(
            Opts::new("events_emitted_total", "Events published to observers")
                .namespace(NAMESPACE),
            &["event"],
        )?;
        registry.register(Box::new(events_emitted_total.clone()))?;

        let cache_invalidations_total = CounterVec::new(
            Opts::new("cache_invalidations_total", "Remote cache invalidation requests")
                .namespace(NAMESPACE),
            &["result"],
        )?;
        registry.register(Box::new(cache_invalidations_total.clone()))?;

        Ok(Arc::new(Self {
            registry,
            polls_total,
            fetch_errors_total,
            fetch_duration_seconds,
            poll_interval_seconds,
            events_emitted_total,
            cache_invalidations_total,
        }))
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
