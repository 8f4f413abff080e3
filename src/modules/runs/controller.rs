use axum::{extract::State, Json};
use std::sync::Arc;

use crate::services::monitor::RelevantRunSpecsMonitor;

use super::model::RunSpecSnapshot;

/// Handler for GET /runs/snapshot
/// Returns the last known run specs snapshot
pub async fn get_snapshot(
    State(monitor): State<Arc<RelevantRunSpecsMonitor>>,
) -> Json<RunSpecSnapshot> {
    let snapshot = monitor.cached().await;
    Json(snapshot.as_ref().clone())
}
