use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::config::PollerConfig;
use crate::modules::runs::{RelevantRunIdentifiers, RunSpecSnapshot};
use crate::services::events::{EventEmitter, RunEvent};
use crate::services::graphql::{CacheInvalidator, CacheKey, RemoteQueryExecutor};
use crate::services::metrics::collectors::{outcome, MonitorMetricsCollector};
use crate::services::metrics::MetricsRegistry;
use crate::services::project::ProjectResolver;

use super::diff::{diff, SnapshotDiff};
use super::fetcher::RunSpecsFetcher;
use super::strategy::PollCadence;

/// What a poll tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No run was of interest, nothing was fetched.
    Skipped,
    Dispatched(DispatchReport),
}

/// Result of dispatching one freshly fetched snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub diff: SnapshotDiff,
    pub invalidated: bool,
}

/// Keeps the last known snapshot of the relevant runs and tells observers
/// when it moves.
pub struct RelevantRunSpecsMonitor {
    fetcher: RunSpecsFetcher,
    invalidator: Arc<dyn CacheInvalidator>,
    resolver: Arc<dyn ProjectResolver>,
    emitter: Arc<dyn EventEmitter>,
    cadence: Arc<PollCadence>,
    cached: RwLock<Arc<RunSpecSnapshot>>,
    tick_lock: Mutex<()>,
    metrics: Option<MonitorMetricsCollector>,
}

impl RelevantRunSpecsMonitor {
    pub fn new(
        executor: Arc<dyn RemoteQueryExecutor>,
        invalidator: Arc<dyn CacheInvalidator>,
        resolver: Arc<dyn ProjectResolver>,
        emitter: Arc<dyn EventEmitter>,
        config: &PollerConfig,
    ) -> Self {
        let cadence = Arc::new(PollCadence::from_config(config));
        let fetcher = RunSpecsFetcher::new(executor, resolver.clone(), cadence.clone());

        Self {
            fetcher,
            invalidator,
            resolver,
            emitter,
            cadence,
            cached: RwLock::new(Arc::new(RunSpecSnapshot::default())),
            tick_lock: Mutex::new(()),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        let collector = MonitorMetricsCollector::new(metrics);
        collector.set_poll_interval(self.cadence.current());
        self.fetcher = self.fetcher.with_metrics(collector.clone());
        self.metrics = Some(collector);
        self
    }

    /// Last known snapshot.
    pub async fn cached(&self) -> Arc<RunSpecSnapshot> {
        self.cached.read().await.clone()
    }

    pub fn cadence(&self) -> &Arc<PollCadence> {
        &self.cadence
    }

    /// Fetch a snapshot without touching the cache or notifying anyone.
    pub async fn fetch(&self, identifiers: &RelevantRunIdentifiers) -> RunSpecSnapshot {
        self.fetcher.fetch(identifiers).await
    }

    /// One fetch, diff and dispatch cycle. Ticks never overlap.
    pub async fn tick(&self, identifiers: &RelevantRunIdentifiers) -> TickOutcome {
        if identifiers.is_empty() {
            tracing::trace!("No relevant runs to poll");
            if let Some(metrics) = &self.metrics {
                metrics.record_poll(outcome::SKIPPED);
            }
            return TickOutcome::Skipped;
        }

        let _guard = self.tick_lock.lock().await;
        let snapshot = self.fetcher.fetch(identifiers).await;
        TickOutcome::Dispatched(self.dispatch_locked(identifiers, snapshot).await)
    }

    /// Store `snapshot` as the last known value and notify observers of
    /// whatever changed relative to the previous one. Waits for any tick in
    /// progress.
    pub async fn dispatch(
        &self,
        identifiers: &RelevantRunIdentifiers,
        snapshot: RunSpecSnapshot,
    ) -> DispatchReport {
        let _guard = self.tick_lock.lock().await;
        self.dispatch_locked(identifiers, snapshot).await
    }

    /// Caller holds `tick_lock`.
    async fn dispatch_locked(
        &self,
        identifiers: &RelevantRunIdentifiers,
        snapshot: RunSpecSnapshot,
    ) -> DispatchReport {
        // 1. Swap the cache, remembering what we replaced
        let current = Arc::new(snapshot);
        let previous = {
            let mut cached = self.cached.write().await;
            std::mem::replace(&mut *cached, current.clone())
        };

        let diff = diff(&previous, &current);
        let mut report = DispatchReport { diff, invalidated: false };

        if diff.is_unchanged() {
            tracing::trace!("Relevant run specs unchanged");
            return report;
        }

        // 2. Spec progress first so run-changed observers read matching counts
        if diff.specs_changed {
            tracing::debug!("Spec progress changed: {:?}", current.run_specs);
            self.emit(RunEvent::SpecsChanged);
        }

        // 3. Status change: refresh the project view if we were watching a running run
        if diff.statuses_changed {
            tracing::info!(
                "Run status changed for {:?}: {:?} -> {:?}",
                identifiers,
                previous.statuses,
                current.statuses
            );

            if previous.current_is_running() {
                if let Some(slug) = self.resolver.project_slug().await {
                    report.invalidated = self.invalidate_project(&slug).await;
                }
            }

            self.emit(RunEvent::RunChanged(*identifiers));
        }

        report
    }

    async fn invalidate_project(&self, slug: &str) -> bool {
        let key = CacheKey::project_by_slug(slug);
        let result = self.invalidator.invalidate(key).await;

        if let Some(metrics) = &self.metrics {
            metrics.record_invalidation(result.is_ok());
        }

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to invalidate cached project {}: {}", slug, e);
                false
            }
        }
    }

    fn emit(&self, event: RunEvent) {
        if let Some(metrics) = &self.metrics {
            metrics.record_event(event.as_str());
        }
        self.emitter.emit(event);
    }
}
