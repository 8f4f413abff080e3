use async_trait::async_trait;
use relevant_run_specs::config::PollerConfig;
use relevant_run_specs::services::events::{EventEmitter, RunEvent};
use relevant_run_specs::services::graphql::{
    CacheInvalidator, CacheKey, QueryError, QueryRequest, RemoteQueryExecutor,
};
use relevant_run_specs::services::monitor::RelevantRunSpecsMonitor;
use relevant_run_specs::services::project::StaticProjectResolver;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;


pub const PROJECT_SLUG: &str = "abc123";

/// Executor that replays canned responses. The last one repeats forever.
// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedExecutor {
    script: Mutex<VecDeque<Result<Value, String>>>,
    requests: Mutex<Vec<QueryRequest>>,
    invalidations: Mutex<Vec<CacheKey>>,
    fail_invalidations: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

#[allow(dead_code)]
impl ScriptedExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, data: Value) {
        self.script.lock().unwrap().push_back(Ok(data));
    }

    pub fn fail(&self, message: &str) {
        self.script.lock().unwrap().push_back(Err(message.to_string()));
    }

    /// Make every query take `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_invalidations(&self) {
        self.fail_invalidations.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn invalidations(&self) -> Vec<CacheKey> {
        self.invalidations.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<Value, String> {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script
                .front()
                .cloned()
                .unwrap_or_else(|| Err("script exhausted".to_string()))
        }
    }
}

#[async_trait]
impl RemoteQueryExecutor for ScriptedExecutor {
    async fn execute(&self, request: QueryRequest) -> Result<Value, QueryError> {
        self.requests.lock().unwrap().push(request);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.next_response().map_err(QueryError::Network)
    }
}

#[async_trait]
impl CacheInvalidator for ScriptedExecutor {
    async fn invalidate(&self, key: CacheKey) -> Result<(), QueryError> {
        self.invalidations.lock().unwrap().push(key);
        if self.fail_invalidations.load(Ordering::SeqCst) {
            return Err(QueryError::Network("invalidation refused".to_string()));
        }
        Ok(())
    }
}

/// Emitter that remembers every event in order.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<RunEvent>>,
}

#[allow(dead_code)]
impl RecordingEmitter {
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventEmitter for RecordingEmitter {
    fn emit(&self, event: RunEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[allow(dead_code)]
pub struct TestContext {
    pub executor: Arc<ScriptedExecutor>,
    pub emitter: Arc<RecordingEmitter>,
    pub resolver: Arc<StaticProjectResolver>,
    pub monitor: Arc<RelevantRunSpecsMonitor>,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Some(PROJECT_SLUG), &PollerConfig::default())
    }

    pub fn with_config(slug: Option<&str>, config: &PollerConfig) -> Self {
        let executor = ScriptedExecutor::new();
        let emitter = Arc::new(RecordingEmitter::default());
        let resolver = Arc::new(StaticProjectResolver::new(slug.map(str::to_string)));

        let monitor = RelevantRunSpecsMonitor::new(
            executor.clone(),
            executor.clone(),
            resolver.clone(),
            emitter.clone(),
            config,
        );

        Self {
            executor,
            emitter,
            resolver,
            monitor: Arc::new(monitor),
        }
    }
}

/// A `CloudRun` node as the cloud returns it.
#[allow(dead_code)]
pub fn cloud_run(run_number: u32, status: &str, completed: u64, total: u64) -> Value {
    json!({
        "id": format!("run-{}", run_number),
        "runNumber": run_number,
        "status": status,
        "completedInstanceCount": completed,
        "totalInstanceCount": total,
        "specs": []
    })
}

/// Response `data` for a found project.
#[allow(dead_code)]
pub fn project_data(current: Option<Value>, next: Option<Value>) -> Value {
    json!({
        "cloudProjectBySlug": {
            "__typename": "CloudProject",
            "id": "project-1",
            "current": current,
            "next": next
        },
        "pollingIntervals": { "runByNumber": null }
    })
}

/// Same as [`project_data`] with a recommended poll interval.
#[allow(dead_code)]
pub fn with_interval(mut data: Value, secs: u64) -> Value {
    data["pollingIntervals"] = json!({ "runByNumber": secs });
    data
}
