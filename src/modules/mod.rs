pub mod metrics;
pub mod runs;
