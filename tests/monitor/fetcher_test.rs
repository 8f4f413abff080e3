// =============================================================================
// INTEGRATION TESTS - RUN SPECS FETCHER
// Query shape, payload normalization and failure collapse
// =============================================================================

use relevant_run_specs::config::PollerConfig;
use relevant_run_specs::modules::runs::schema::RELEVANT_RUN_SPECS_OPERATION;
use relevant_run_specs::modules::runs::{RelevantRunIdentifiers, RunProgress, RunSpecSnapshot, RunStatus};
use relevant_run_specs::services::graphql::{CacheKey, CachePolicy};
use serde_json::json;
use std::time::Duration;

use crate::common::{cloud_run, project_data, with_interval, TestContext, PROJECT_SLUG};

#[tokio::test]
async fn test_no_project_returns_empty_without_remote_call() {
    let ctx = TestContext::with_config(None, &PollerConfig::default());
    ctx.executor.respond(project_data(Some(cloud_run(5, "RUNNING", 2, 10)), None));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert_eq!(snapshot, RunSpecSnapshot::default());
    assert_eq!(ctx.executor.calls(), 0);
}

#[tokio::test]
async fn test_query_uses_flag_gated_variables_and_bypasses_cache() {
    let ctx = TestContext::new();
    ctx.executor.respond(project_data(None, Some(cloud_run(7, "RUNNING", 0, 3))));

    ctx.monitor.fetch(&RelevantRunIdentifiers::new(None, Some(7))).await;

    let requests = ctx.executor.requests();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.operation_name, RELEVANT_RUN_SPECS_OPERATION);
    assert_eq!(request.policy, CachePolicy::NetworkOnly);
    assert_eq!(request.cache_keys, vec![CacheKey::project_by_slug(PROJECT_SLUG)]);
    assert_eq!(
        request.variables,
        json!({
            "projectSlug": PROJECT_SLUG,
            "currentRunNumber": -1,
            "hasCurrent": false,
            "nextRunNumber": 7,
            "hasNext": true,
        })
    );
}

#[tokio::test]
async fn test_fetch_normalizes_running_run() {
    let ctx = TestContext::new();
    ctx.executor.respond(project_data(Some(cloud_run(5, "RUNNING", 2, 10)), None));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert_eq!(
        snapshot.run_specs.current,
        Some(RunProgress { run_number: 5, total_specs: 10, completed_specs: 2 })
    );
    assert_eq!(snapshot.statuses.current, Some(RunStatus::Running));
    assert_eq!(snapshot.run_specs.next, None);
    assert_eq!(snapshot.statuses.next, None);
}

#[tokio::test]
async fn test_fetch_does_not_touch_cache() {
    let ctx = TestContext::new();
    ctx.executor.respond(project_data(Some(cloud_run(5, "RUNNING", 2, 10)), None));

    ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert!(ctx.monitor.cached().await.is_empty());
    assert!(ctx.emitter.events().is_empty());
}

#[tokio::test]
async fn test_transport_error_returns_empty_snapshot() {
    let ctx = TestContext::new();
    ctx.executor.fail("connection reset");

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert_eq!(snapshot, RunSpecSnapshot::default());
    assert_eq!(ctx.executor.calls(), 1);
}

#[tokio::test]
async fn test_non_project_union_member_returns_empty_snapshot() {
    let ctx = TestContext::new();
    ctx.executor.respond(json!({
        "cloudProjectBySlug": { "__typename": "CloudProjectUnauthorized" },
        "pollingIntervals": { "runByNumber": null }
    }));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_missing_project_field_returns_empty_snapshot() {
    let ctx = TestContext::new();
    ctx.executor.respond(json!({ "cloudProjectBySlug": null }));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_unexpected_payload_shape_returns_empty_snapshot() {
    let ctx = TestContext::new();
    ctx.executor.respond(json!({ "cloudProjectBySlug": { "id": "missing typename" } }));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_malformed_counts_only_suppress_their_slot() {
    let ctx = TestContext::new();
    let broken_current = json!({
        "id": "run-5",
        "runNumber": 5,
        "status": "RUNNING",
        "completedInstanceCount": "two",
        "totalInstanceCount": 10,
        "specs": []
    });
    ctx.executor.respond(project_data(Some(broken_current), Some(cloud_run(6, "RUNNING", 1, 4))));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), Some(6))).await;

    assert_eq!(snapshot.statuses.current, Some(RunStatus::Running));
    assert_eq!(snapshot.run_specs.current, None);
    assert_eq!(snapshot.statuses.next, Some(RunStatus::Running));
    assert_eq!(
        snapshot.run_specs.next,
        Some(RunProgress { run_number: 6, total_specs: 4, completed_specs: 1 })
    );
}

#[tokio::test]
async fn test_recommended_interval_updates_cadence() {
    let ctx = TestContext::new();
    ctx.executor.respond(with_interval(project_data(Some(cloud_run(5, "RUNNING", 2, 10)), None), 45));

    ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert_eq!(ctx.monitor.cadence().current(), Duration::from_secs(45));
}

#[tokio::test]
async fn test_recommended_interval_applies_without_project_data() {
    let ctx = TestContext::new();
    ctx.executor.respond(json!({
        "cloudProjectBySlug": { "__typename": "CloudProjectNotFound" },
        "pollingIntervals": { "runByNumber": 60 }
    }));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert!(snapshot.is_empty());
    assert_eq!(ctx.monitor.cadence().current(), Duration::from_secs(60));
}

#[tokio::test]
async fn test_failed_query_keeps_cadence() {
    let ctx = TestContext::new();
    ctx.executor.fail("timeout");

    ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert_eq!(ctx.monitor.cadence().current(), Duration::from_secs(15));
}

#[tokio::test]
async fn test_null_specs_do_not_spoil_payload() {
    let ctx = TestContext::new();
    let mut next = cloud_run(6, "RUNNING", 1, 4);
    next["specs"] = json!(null);
    ctx.executor.respond(with_interval(
        project_data(Some(cloud_run(5, "RUNNING", 2, 10)), Some(next)),
        40,
    ));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), Some(6))).await;

    assert_eq!(
        snapshot.run_specs.current,
        Some(RunProgress { run_number: 5, total_specs: 10, completed_specs: 2 })
    );
    assert_eq!(
        snapshot.run_specs.next,
        Some(RunProgress { run_number: 6, total_specs: 4, completed_specs: 1 })
    );
    assert_eq!(ctx.monitor.cadence().current(), Duration::from_secs(40));
}

#[tokio::test]
async fn test_spec_node_without_id_is_ignored() {
    let ctx = TestContext::new();
    let mut current = cloud_run(5, "RUNNING", 2, 10);
    current["specs"] = json!([{ "status": "RUNNING" }, { "id": 42 }]);
    ctx.executor.respond(project_data(Some(current), None));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert_eq!(snapshot.statuses.current, Some(RunStatus::Running));
    assert_eq!(
        snapshot.run_specs.current,
        Some(RunProgress { run_number: 5, total_specs: 10, completed_specs: 2 })
    );
}

#[tokio::test]
async fn test_non_string_status_only_empties_its_slot() {
    let ctx = TestContext::new();
    let mut next = cloud_run(6, "RUNNING", 1, 4);
    next["status"] = json!({ "value": "RUNNING" });
    ctx.executor.respond(with_interval(
        project_data(Some(cloud_run(5, "PASSED", 10, 10)), Some(next)),
        40,
    ));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), Some(6))).await;

    assert_eq!(snapshot.statuses.current, Some(RunStatus::Passed));
    assert_eq!(snapshot.statuses.next, None);
    assert_eq!(snapshot.run_specs.next, None);
    assert_eq!(ctx.monitor.cadence().current(), Duration::from_secs(40));
}

#[tokio::test]
async fn test_malformed_project_keeps_recommended_interval() {
    let ctx = TestContext::new();
    ctx.executor.respond(json!({
        "cloudProjectBySlug": "CloudProject",
        "pollingIntervals": { "runByNumber": 25 }
    }));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert!(snapshot.is_empty());
    assert_eq!(ctx.monitor.cadence().current(), Duration::from_secs(25));
}

#[tokio::test]
async fn test_non_object_data_returns_empty_snapshot() {
    let ctx = TestContext::new();
    ctx.executor.respond(json!("not an object"));

    let snapshot = ctx.monitor.fetch(&RelevantRunIdentifiers::new(Some(5), None)).await;

    assert!(snapshot.is_empty());
    assert_eq!(ctx.monitor.cadence().current(), Duration::from_secs(15));
}
