use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::PollerConfig;

/// Delay between poll ticks.
///
/// Starts at the configured interval and follows whatever the cloud
/// recommends, clamped to the configured bounds. The poller reads it once per
/// tick, after the tick settles, so an update never touches a wait that is
/// already scheduled.
#[derive(Debug)]
pub struct PollCadence {
    secs: AtomicU64,
    min_secs: u64,
    max_secs: u64,
}

impl PollCadence {
    pub fn new(initial_secs: u64, min_secs: u64, max_secs: u64) -> Self {
        let min_secs = min_secs.max(1);
        let max_secs = max_secs.max(min_secs);
        Self {
            secs: AtomicU64::new(initial_secs.clamp(min_secs, max_secs)),
            min_secs,
            max_secs,
        }
    }

    pub fn from_config(config: &PollerConfig) -> Self {
        Self::new(
            config.initial_interval_secs,
            config.min_interval_secs,
            config.max_interval_secs,
        )
    }

    pub fn current(&self) -> Duration {
        Duration::from_secs(self.secs.load(Ordering::Relaxed))
    }

    /// Set the interval, clamped to the bounds. Returns the stored value.
    pub fn set_secs(&self, secs: u64) -> Duration {
        let clamped = secs.clamp(self.min_secs, self.max_secs);
        self.secs.store(clamped, Ordering::Relaxed);
        Duration::from_secs(clamped)
    }

    /// Apply a server recommended interval in seconds.
    ///
    /// Non-finite or non-positive values are ignored. Returns the new interval
    /// when it differs from the previous one.
    pub fn apply_recommendation(&self, recommended_secs: Option<f64>) -> Option<Duration> {
        let secs = recommended_secs.filter(|s| s.is_finite() && *s > 0.0)?;
        let secs = secs.round().max(1.0) as u64;

        let previous = self.current();
        let updated = self.set_secs(secs);
        (updated != previous).then_some(updated)
    }
}

impl Default for PollCadence {
    fn default() -> Self {
        Self::from_config(&PollerConfig::default())
    }
}
