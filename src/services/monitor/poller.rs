use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::modules::runs::{RelevantRunIdentifiers, RunSpecSnapshot};

use super::engine::RelevantRunSpecsMonitor;

/// Returned by [`AdaptivePoller::start`]. Starting an already running poller
/// hands back a clone of the same handle.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerHandle {
    /// Increments with every fresh polling cycle.
    pub generation: u64,
    /// Cached snapshot at the time the cycle started.
    pub initial_value: Arc<RunSpecSnapshot>,
}

enum PollerState {
    Idle,
    Running {
        handle: PollerHandle,
        shutdown: watch::Sender<bool>,
        task: JoinHandle<()>,
    },
}

/// Drives [`RelevantRunSpecsMonitor::tick`] on the monitor's cadence.
pub struct AdaptivePoller {
    monitor: Arc<RelevantRunSpecsMonitor>,
    identifiers: watch::Sender<RelevantRunIdentifiers>,
    state: Mutex<PollerState>,
    generation: AtomicU64,
}

impl AdaptivePoller {
    pub fn new(monitor: Arc<RelevantRunSpecsMonitor>) -> Self {
        let (identifiers, _rx) = watch::channel(RelevantRunIdentifiers::default());
        Self {
            monitor,
            identifiers,
            state: Mutex::new(PollerState::Idle),
            generation: AtomicU64::new(0),
        }
    }

    pub fn monitor(&self) -> &Arc<RelevantRunSpecsMonitor> {
        &self.monitor
    }

    /// Runs of interest. Picked up by the next tick.
    pub fn set_identifiers(&self, identifiers: RelevantRunIdentifiers) {
        self.identifiers.send_replace(identifiers);
    }

    pub fn identifiers(&self) -> RelevantRunIdentifiers {
        *self.identifiers.borrow()
    }

    pub async fn is_running(&self) -> bool {
        matches!(*self.state.lock().await, PollerState::Running { .. })
    }

    /// Start polling `identifiers`. The first tick runs right away.
    ///
    /// While running this is a no-op returning the existing handle; the
    /// identifiers are still updated for the next tick.
    pub async fn start(&self, identifiers: RelevantRunIdentifiers) -> PollerHandle {
        self.set_identifiers(identifiers);

        let mut state = self.state.lock().await;
        if let PollerState::Running { handle, .. } = &*state {
            tracing::debug!("Poller already running (generation {})", handle.generation);
            return handle.clone();
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = PollerHandle {
            generation,
            initial_value: self.monitor.cached().await,
        };

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(
            self.monitor.clone(),
            self.identifiers.subscribe(),
            shutdown_rx,
        ));

        tracing::info!(
            "Started run specs poller (generation {}, interval {:?})",
            generation,
            self.monitor.cadence().current()
        );

        *state = PollerState::Running {
            handle: handle.clone(),
            shutdown,
            task,
        };
        handle
    }

    /// Stop scheduling ticks. A tick already in flight still completes.
    /// Returns false if the poller was idle.
    pub async fn stop(&self) -> bool {
        self.take_task().await.is_some()
    }

    /// Stop and wait for an in-flight tick to settle.
    pub async fn shutdown(&self) {
        if let Some(task) = self.take_task().await {
            if let Err(e) = task.await {
                tracing::error!("Run specs poller task failed: {}", e);
            }
        }
    }

    async fn take_task(&self) -> Option<JoinHandle<()>> {
        let mut state = self.state.lock().await;
        match std::mem::replace(&mut *state, PollerState::Idle) {
            PollerState::Idle => None,
            PollerState::Running { handle, shutdown, task } => {
                let _ = shutdown.send(true);
                tracing::info!("Stopped run specs poller (generation {})", handle.generation);
                Some(task)
            }
        }
    }
}

async fn run_loop(
    monitor: Arc<RelevantRunSpecsMonitor>,
    identifiers: watch::Receiver<RelevantRunIdentifiers>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let current = *identifiers.borrow();
        monitor.tick(&current).await;

        // Cadence is read once the tick settles; a wait in progress is never adjusted
        let delay = monitor.cadence().current();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
    }
}
