pub mod diff;
pub mod engine;
pub mod fetcher;
pub mod poller;
pub mod strategy;

pub use diff::{diff, SnapshotDiff};
pub use engine::{DispatchReport, RelevantRunSpecsMonitor, TickOutcome};
pub use fetcher::{format_run_progress, RunSpecsFetcher};
pub use poller::{AdaptivePoller, PollerHandle};
pub use strategy::PollCadence;
