use crate::modules::runs::RunSpecSnapshot;

/// Which parts of a snapshot moved between two polls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub specs_changed: bool,
    pub statuses_changed: bool,
}

impl SnapshotDiff {
    pub fn is_unchanged(&self) -> bool {
        !self.specs_changed && !self.statuses_changed
    }
}

/// Structural comparison of spec progress and statuses, slot by slot.
pub fn diff(previous: &RunSpecSnapshot, next: &RunSpecSnapshot) -> SnapshotDiff {
    SnapshotDiff {
        specs_changed: previous.run_specs != next.run_specs,
        statuses_changed: previous.statuses != next.statuses,
    }
}
