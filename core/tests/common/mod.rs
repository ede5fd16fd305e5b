//! Shared harness for orchestrator integration tests: an in-memory
//! record store, a scripted scheduler stub, and tempdir-backed artifact
//! directories.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use syncflow_core::api::{
    ConnectionInfo, ConnectorType, IncrementalColumnType, IncrementalSpec, JobLimits,
    MemoryConnectionResolver, MemoryTaskStore, MetadataStoreConfig, RegistrationPoll,
    RuntimeConfig, SchedulerError, SyncMode, TaskDraft, TaskOrchestrator, TaskStatus,
    WorkflowStatus,
};
use syncflow_core::artifact::ArtifactStore;
use syncflow_core::scheduler::{RunState, SchedulerApi};

/// Scripted scheduler: `get_status` pops one scripted answer per call
/// (defaulting to registered+unpaused when the script runs out), and
/// every wire call is appended to `calls`.
pub struct StubScheduler {
    statuses: Mutex<VecDeque<Option<WorkflowStatus>>>,
    running: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl StubScheduler {
    pub fn new(statuses: Vec<Option<WorkflowStatus>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            running: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_running(self, runs: Vec<&str>) -> Self {
        *self.running.lock().unwrap() = runs.into_iter().map(String::from).collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchedulerApi for StubScheduler {
    async fn get_status(
        &self,
        _workflow_id: &str,
    ) -> Result<Option<WorkflowStatus>, SchedulerError> {
        self.calls.lock().unwrap().push("status".into());
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Some(WorkflowStatus { paused: false })))
    }

    async fn set_paused(&self, _workflow_id: &str, paused: bool) -> Result<(), SchedulerError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("set_paused:{paused}"));
        Ok(())
    }

    async fn trigger_run(&self, _workflow_id: &str) -> Result<String, SchedulerError> {
        self.calls.lock().unwrap().push("trigger".into());
        Ok("run-001".into())
    }

    async fn list_runs(
        &self,
        _workflow_id: &str,
        state: RunState,
    ) -> Result<Vec<String>, SchedulerError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("list:{}", state.as_str()));
        Ok(self.running.lock().unwrap().clone())
    }

    async fn cancel_run(&self, _workflow_id: &str, run_id: &str) -> Result<(), SchedulerError> {
        self.calls.lock().unwrap().push(format!("cancel:{run_id}"));
        Ok(())
    }
}

pub fn connections() -> Vec<ConnectionInfo> {
    let conn = |id, name: &str, ty, port| ConnectionInfo {
        id,
        name: name.to_string(),
        connector_type: ty,
        host: "db.internal".into(),
        port,
        database: "appdb".into(),
        user: "etl".into(),
        secret: "s3cret".into(),
    };
    vec![
        conn(1, "orders-mysql", ConnectorType::MySql, 3306),
        conn(2, "warehouse-pg", ConnectorType::PostgreSql, 5432),
        conn(3, "events-mongo", ConnectorType::MongoDb, 27017),
        conn(4, "bus-kafka", ConnectorType::Kafka, 9092),
    ]
}

pub struct Harness {
    // Held for its Drop; the orchestrator writes beneath it.
    _dir: TempDir,
    pub jobs_dir: PathBuf,
    pub workflows_dir: PathBuf,
    pub scheduler: Arc<StubScheduler>,
    pub tasks: Arc<MemoryTaskStore>,
    pub orchestrator: TaskOrchestrator,
}

pub fn harness(scheduler: StubScheduler) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let jobs_dir = dir.path().join("jobs");
    let workflows_dir = dir.path().join("dags");
    let tasks = Arc::new(MemoryTaskStore::new());
    let scheduler = Arc::new(scheduler);

    let orchestrator = TaskOrchestrator::new(
        tasks.clone(),
        Arc::new(MemoryConnectionResolver::with(connections())),
        ArtifactStore::new(&jobs_dir, &workflows_dir).unwrap(),
        scheduler.clone(),
        JobLimits::default(),
        RuntimeConfig::default(),
        MetadataStoreConfig::default(),
        RegistrationPoll {
            max_attempts: 10,
            interval: std::time::Duration::from_millis(2),
        },
    );

    Harness {
        _dir: dir,
        jobs_dir,
        workflows_dir,
        scheduler,
        tasks,
        orchestrator,
    }
}

/// Incremental MySQL-to-PostgreSQL draft on connections 1 and 2.
pub fn incremental_draft(name: &str) -> TaskDraft {
    TaskDraft {
        name: name.to_string(),
        mode: SyncMode::Incremental,
        source_id: 1,
        source_table: "orders".into(),
        target_id: 2,
        target_table: "orders_raw".into(),
        schedule: "*/5 * * * *".into(),
        incremental: Some(IncrementalSpec {
            column: "id".into(),
            column_type: IncrementalColumnType::Int,
        }),
        columns: vec![],
        status: TaskStatus::Enabled,
    }
}

pub fn full_draft(name: &str) -> TaskDraft {
    TaskDraft {
        mode: SyncMode::Full,
        incremental: None,
        ..incremental_draft(name)
    }
}
