use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::modules::runs::schema::{
    CloudProjectResult, CloudRunNode, RelevantRunSpecsData, RelevantRunSpecsVariables,
    RELEVANT_RUN_SPECS_OPERATION, RELEVANT_RUN_SPECS_QUERY,
};
use crate::modules::runs::{RelevantRunIdentifiers, RunProgress, RunSpecSnapshot};
use crate::services::graphql::{CacheKey, CachePolicy, QueryRequest, RemoteQueryExecutor};
use crate::services::metrics::collectors::{outcome, MonitorMetricsCollector};
use crate::services::project::ProjectResolver;

use super::strategy::PollCadence;

/// Queries the cloud for the tracked runs and normalizes the answer into a
/// [`RunSpecSnapshot`]. Every failure collapses to the empty snapshot.
pub struct RunSpecsFetcher {
    executor: Arc<dyn RemoteQueryExecutor>,
    resolver: Arc<dyn ProjectResolver>,
    cadence: Arc<PollCadence>,
    metrics: Option<MonitorMetricsCollector>,
}

impl RunSpecsFetcher {
    pub fn new(
        executor: Arc<dyn RemoteQueryExecutor>,
        resolver: Arc<dyn ProjectResolver>,
        cadence: Arc<PollCadence>,
    ) -> Self {
        Self {
            executor,
            resolver,
            cadence,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: MonitorMetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn fetch(&self, identifiers: &RelevantRunIdentifiers) -> RunSpecSnapshot {
        // 1. No linked project means nothing to ask for
        let Some(project_slug) = self.resolver.project_slug().await else {
            tracing::debug!("No cloud project linked, skipping run specs query");
            self.record_poll(outcome::NO_PROJECT);
            return RunSpecSnapshot::default();
        };

        // 2. Query, always bypassing the local response cache
        let variables = RelevantRunSpecsVariables::new(&project_slug, identifiers);
        let request = QueryRequest {
            operation_name: RELEVANT_RUN_SPECS_OPERATION,
            query: RELEVANT_RUN_SPECS_QUERY,
            variables: serde_json::to_value(&variables).unwrap_or(Value::Null),
            policy: CachePolicy::NetworkOnly,
            cache_keys: vec![CacheKey::project_by_slug(&project_slug)],
        };

        let start = Instant::now();
        let result = self.executor.execute(request).await;
        if let Some(metrics) = &self.metrics {
            metrics.record_fetch(start.elapsed());
        }

        let data = match result {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Run specs query failed for project {}: {}", project_slug, e);
                if let Some(metrics) = &self.metrics {
                    metrics.record_fetch_error(e.kind());
                }
                self.record_poll(outcome::ERROR);
                return RunSpecSnapshot::default();
            }
        };

        let Some(data) = RelevantRunSpecsData::from_value(&data) else {
            tracing::warn!("Unexpected run specs payload for project {}: {}", project_slug, data);
            if let Some(metrics) = &self.metrics {
                metrics.record_fetch_error("parse");
            }
            self.record_poll(outcome::ERROR);
            return RunSpecSnapshot::default();
        };

        // 3. Follow the server's cadence, found project or not
        if let Some(interval) = self.cadence.apply_recommendation(data.recommended_interval_secs) {
            tracing::info!("Run specs poll interval is now {:?}", interval);
            if let Some(metrics) = &self.metrics {
                metrics.set_poll_interval(interval);
            }
        }

        // 4. Only a CloudProject carries runs
        match data.cloud_project_by_slug {
            Some(project) if project.is_project() => {
                self.record_poll(outcome::FETCHED);
                snapshot_from_project(&project)
            }
            other => {
                tracing::debug!(
                    "Project {} resolved to {}, no run data",
                    project_slug,
                    other.as_ref().map(|p| p.typename.as_str()).unwrap_or("null")
                );
                self.record_poll(outcome::NOT_FOUND);
                RunSpecSnapshot::default()
            }
        }
    }

    fn record_poll(&self, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_poll(outcome);
        }
    }
}

/// Status is recorded whenever present; progress only when it is well formed.
pub fn snapshot_from_project(project: &CloudProjectResult) -> RunSpecSnapshot {
    let mut snapshot = RunSpecSnapshot::default();

    if let Some(run) = &project.current {
        if let Some(status) = &run.status {
            snapshot.statuses.current = Some(status.clone());
            snapshot.run_specs.current = format_run_progress(run);
        }
    }

    if let Some(run) = &project.next {
        if let Some(status) = &run.status {
            snapshot.statuses.next = Some(status.clone());
            snapshot.run_specs.next = format_run_progress(run);
        }
    }

    snapshot
}

/// Progress for a run, or `None` unless the run number is positive and both
/// instance counts are finite non-negative integers.
pub fn format_run_progress(run: &CloudRunNode) -> Option<RunProgress> {
    let run_number = finite_number(run.run_number.as_ref())
        .filter(|n| *n > 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX))?;
    let total_specs = count(run.total_instance_count.as_ref())?;
    let completed_specs = count(run.completed_instance_count.as_ref())?;

    Some(RunProgress {
        run_number: run_number as u32,
        total_specs,
        completed_specs,
    })
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| n.is_finite())
}

fn count(value: Option<&Value>) -> Option<u64> {
    finite_number(value)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .map(|n| n as u64)
}
