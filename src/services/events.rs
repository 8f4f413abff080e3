use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::modules::runs::RelevantRunIdentifiers;

/// Notifications published by the run specs monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RunEvent {
    /// Spec progress changed; consumers re-read the cached snapshot.
    SpecsChanged,
    /// Status of a tracked run changed. Carries the identifiers that were polled.
    RunChanged(RelevantRunIdentifiers),
}

impl RunEvent {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SpecsChanged => "relevant_run_specs.specs_changed",
            Self::RunChanged(_) => "relevant_run_specs.run_changed",
        }
    }
}

pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: RunEvent);
}

/// Event envelope stamped with the publish time (RFC3339).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub time: String,
    pub event: RunEvent,
}

/// Broadcast bus for [`RunEvent`]s. Publishing with no subscribers is fine.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventEmitter for EventBus {
    fn emit(&self, event: RunEvent) {
        let time = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        tracing::debug!("Publishing {}", event.as_str());
        let _ = self.tx.send(EventEnvelope { time, event });
    }
}
