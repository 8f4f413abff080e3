use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::{RelevantRunIdentifiers, RunStatus};

pub const RELEVANT_RUN_SPECS_OPERATION: &str = "RelevantRunSpecsDataSource_Specs";

/// Typename the cloud uses when the slug resolved to a project.
pub const CLOUD_PROJECT_TYPENAME: &str = "CloudProject";

/// Sent instead of a run number for a slot that is not tracked.
pub const UNTRACKED_RUN_NUMBER: i64 = -1;

pub const RELEVANT_RUN_SPECS_QUERY: &str = r#"
fragment RelevantRunSpecsDataSource_Runs on CloudRun {
  id
  runNumber
  status
  completedInstanceCount
  totalInstanceCount
  specs {
    id
    status
  }
}

query RelevantRunSpecsDataSource_Specs(
  $projectSlug: String!
  $currentRunNumber: Int!
  $hasCurrent: Boolean!
  $nextRunNumber: Int!
  $hasNext: Boolean!
) {
  cloudProjectBySlug(slug: $projectSlug) {
    __typename
    ... on CloudProject {
      id
      current: runByNumber(runNumber: $currentRunNumber) @include(if: $hasCurrent) {
        ...RelevantRunSpecsDataSource_Runs
      }
      next: runByNumber(runNumber: $nextRunNumber) @include(if: $hasNext) {
        ...RelevantRunSpecsDataSource_Runs
      }
    }
  }
  pollingIntervals {
    runByNumber
  }
}
"#;

/// Variables for [`RELEVANT_RUN_SPECS_QUERY`].
///
/// Untracked slots are sent with a sentinel run number and a false flag so the
/// same document serves every combination of slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantRunSpecsVariables {
    pub project_slug: String,
    pub current_run_number: i64,
    pub has_current: bool,
    pub next_run_number: i64,
    pub has_next: bool,
}

impl RelevantRunSpecsVariables {
    pub fn new(project_slug: &str, identifiers: &RelevantRunIdentifiers) -> Self {
        Self {
            project_slug: project_slug.to_string(),
            current_run_number: slot_run_number(identifiers.current),
            has_current: RelevantRunIdentifiers::is_tracked(identifiers.current),
            next_run_number: slot_run_number(identifiers.next),
            has_next: RelevantRunIdentifiers::is_tracked(identifiers.next),
        }
    }
}

fn slot_run_number(run_number: Option<u32>) -> i64 {
    run_number.map(i64::from).unwrap_or(UNTRACKED_RUN_NUMBER)
}

/// `data` of a successful response.
///
/// Read field by field from the raw JSON: a malformed part only loses itself,
/// never the interval recommendation or the other run slot.
#[derive(Debug, Clone, Default)]
pub struct RelevantRunSpecsData {
    pub cloud_project_by_slug: Option<CloudProjectResult>,
    /// `pollingIntervals.runByNumber`, in seconds.
    pub recommended_interval_secs: Option<f64>,
}

impl RelevantRunSpecsData {
    /// `None` when `data` is not a JSON object.
    pub fn from_value(data: &Value) -> Option<Self> {
        let fields = data.as_object()?;

        let recommended_interval_secs = fields
            .get("pollingIntervals")
            .and_then(|intervals| intervals.get("runByNumber"))
            .and_then(Value::as_f64);

        Some(Self {
            cloud_project_by_slug: fields
                .get("cloudProjectBySlug")
                .and_then(CloudProjectResult::from_value),
            recommended_interval_secs,
        })
    }
}

/// `cloudProjectBySlug` is a union; only `CloudProject` carries runs.
#[derive(Debug, Clone)]
pub struct CloudProjectResult {
    pub typename: String,
    pub id: Option<String>,
    pub current: Option<CloudRunNode>,
    pub next: Option<CloudRunNode>,
}

impl CloudProjectResult {
    /// `None` without a string `__typename`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let typename = value.get("__typename")?.as_str()?.to_string();

        Some(Self {
            typename,
            id: string_field(value, "id"),
            current: value.get("current").and_then(CloudRunNode::from_value),
            next: value.get("next").and_then(CloudRunNode::from_value),
        })
    }

    pub fn is_project(&self) -> bool {
        self.typename == CLOUD_PROJECT_TYPENAME
    }
}

/// Numeric fields stay raw so a malformed count only spoils its own slot.
#[derive(Debug, Clone, Default)]
pub struct CloudRunNode {
    pub id: Option<String>,
    pub run_number: Option<Value>,
    /// `None` when missing or not a string.
    pub status: Option<RunStatus>,
    pub completed_instance_count: Option<Value>,
    pub total_instance_count: Option<Value>,
    pub specs: Vec<CloudSpecNode>,
}

impl CloudRunNode {
    /// `None` when the slot is absent, `null` or not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;

        let specs = fields
            .get("specs")
            .and_then(Value::as_array)
            .map(|specs| specs.iter().filter_map(CloudSpecNode::from_value).collect())
            .unwrap_or_default();

        Some(Self {
            id: string_field(value, "id"),
            run_number: fields.get("runNumber").cloned(),
            status: string_field(value, "status").map(RunStatus::from),
            completed_instance_count: fields.get("completedInstanceCount").cloned(),
            total_instance_count: fields.get("totalInstanceCount").cloned(),
            specs,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudSpecNode {
    pub id: String,
    pub status: Option<String>,
}

impl CloudSpecNode {
    /// Nodes without a string `id` are skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            id: string_field(value, "id")?,
            status: string_field(value, "status"),
        })
    }
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}
