use serde::{Deserialize, Serialize};

/// Status reported by the cloud for a single run.
///
/// The set of values is owned by the remote schema. Anything we do not know
/// about is kept verbatim so two different unknown statuses never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Running,
    Passed,
    Failed,
    Errored,
    TimedOut,
    OverLimit,
    Cancelled,
    NoTests,
    Other(String),
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "RUNNING",
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Errored => "ERRORED",
            Self::TimedOut => "TIMEDOUT",
            Self::OverLimit => "OVERLIMIT",
            Self::Cancelled => "CANCELLED",
            Self::NoTests => "NOTESTS",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl From<String> for RunStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "RUNNING" => Self::Running,
            "PASSED" => Self::Passed,
            "FAILED" => Self::Failed,
            "ERRORED" => Self::Errored,
            "TIMEDOUT" => Self::TimedOut,
            "OVERLIMIT" => Self::OverLimit,
            "CANCELLED" => Self::Cancelled,
            "NOTESTS" => Self::NoTests,
            _ => Self::Other(raw),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spec progress of one run. Only built from a payload with a positive run
/// number and two valid counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProgress {
    pub run_number: u32,
    pub total_specs: u64,
    pub completed_specs: u64,
}

/// Which run numbers are of interest for a poll. An unset slot is not tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevantRunIdentifiers {
    pub current: Option<u32>,
    pub next: Option<u32>,
}

impl RelevantRunIdentifiers {
    pub fn new(current: Option<u32>, next: Option<u32>) -> Self {
        Self { current, next }
    }

    /// True when neither slot names a positive run number.
    pub fn is_empty(&self) -> bool {
        !Self::is_tracked(self.current) && !Self::is_tracked(self.next)
    }

    pub(crate) fn is_tracked(run_number: Option<u32>) -> bool {
        matches!(run_number, Some(n) if n > 0)
    }
}

/// One value per tracked slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSlots<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<T>,
}

impl<T> Default for RunSlots<T> {
    fn default() -> Self {
        Self { current: None, next: None }
    }
}

impl<T> RunSlots<T> {
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.next.is_none()
    }
}

/// Spec progress and statuses for the tracked runs at one point in time.
///
/// `Default` is the canonical empty snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSpecSnapshot {
    pub run_specs: RunSlots<RunProgress>,
    pub statuses: RunSlots<RunStatus>,
}

impl RunSpecSnapshot {
    pub fn is_empty(&self) -> bool {
        self.run_specs.is_empty() && self.statuses.is_empty()
    }

    /// Whether the run in the `current` slot was last seen running.
    pub fn current_is_running(&self) -> bool {
        self.statuses
            .current
            .as_ref()
            .map(RunStatus::is_running)
            .unwrap_or(false)
    }
}
