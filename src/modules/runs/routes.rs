use axum::{routing::get, Router};
use std::sync::Arc;

use crate::services::monitor::RelevantRunSpecsMonitor;
use super::controller::get_snapshot;

pub fn run_routes(monitor: Arc<RelevantRunSpecsMonitor>) -> Router {
    Router::new()
        .route("/snapshot", get(get_snapshot))
        .with_state(monitor)
}
