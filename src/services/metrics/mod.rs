pub mod registry;
pub mod collectors;

pub use registry::MetricsRegistry;
pub use collectors::MonitorMetricsCollector;
