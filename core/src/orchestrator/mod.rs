//! Sync-task lifecycle coordinator.
//!
//! One instance is constructed at process start and shared by reference;
//! there is no process-wide singleton. Operations against the same task
//! id are serialized through a per-id lock map so artifact writes and
//! start/stop calls never interleave; distinct ids run concurrently.
//!
//! Record writes and artifact writes are *not* transactional: an artifact
//! failure after the record is committed is reported to the caller and
//! the record stays. This matches the behavior of the system this
//! replaces and is deliberately not auto-corrected.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::artifact::{ArtifactNames, ArtifactStore};
use crate::config::{MetadataStoreConfig, RuntimeConfig};
use crate::error::{OrchestratorError, ValidationError};
use crate::jobspec::{self, JobLimits};
use crate::scheduler::{
    wait_for_registration, RegistrationPoll, RunHandle, RunState, SchedulerApi, StopOutcome,
};
use crate::store::{ConnectionResolver, TaskRecordStore};
use crate::task::{
    ConnectionInfo, Endpoint, SyncMode, SyncTask, TaskDraft, TaskPatch, TaskStatus,
};
use crate::workflow;

/// Task record joined with resolved connection names, as the list/detail
/// surfaces expose it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: SyncTask,
    pub source_name: Option<String>,
    pub target_name: Option<String>,
}

/// List filter; all criteria are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub mode: Option<SyncMode>,
    pub name_contains: Option<String>,
    pub connection_id: Option<u64>,
}

pub struct TaskOrchestrator {
    tasks: Arc<dyn TaskRecordStore>,
    connections: Arc<dyn ConnectionResolver>,
    artifacts: ArtifactStore,
    scheduler: Arc<dyn SchedulerApi>,
    limits: JobLimits,
    runtime: RuntimeConfig,
    metadata_store: MetadataStoreConfig,
    poll: RegistrationPoll,
    locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl TaskOrchestrator {
    pub fn new(
        tasks: Arc<dyn TaskRecordStore>,
        connections: Arc<dyn ConnectionResolver>,
        artifacts: ArtifactStore,
        scheduler: Arc<dyn SchedulerApi>,
        limits: JobLimits,
        runtime: RuntimeConfig,
        metadata_store: MetadataStoreConfig,
        poll: RegistrationPoll,
    ) -> Self {
        Self {
            tasks,
            connections,
            artifacts,
            scheduler,
            limits,
            runtime,
            metadata_store,
            poll,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Serializes operations on one task id. The guard is owned so it can
    /// be held across awaits.
    async fn lock_task(&self, id: u64) -> tokio::sync::OwnedMutexGuard<()> {
        let cell = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        cell.lock_owned().await
    }

    async fn resolve(&self, id: u64) -> Result<ConnectionInfo, OrchestratorError> {
        self.connections
            .get(id)
            .await?
            .ok_or_else(|| ValidationError::UnknownConnection(id).into())
    }

    /// Generates and writes both artifacts for `task`.
    async fn write_artifacts(
        &self,
        task: &SyncTask,
        source: &ConnectionInfo,
        target: &ConnectionInfo,
    ) -> Result<ArtifactNames, OrchestratorError> {
        let names = ArtifactNames::for_task(
            task.id,
            task.source.connector_type,
            task.target.connector_type,
        );
        let spec = jobspec::generate(task, source, target, self.limits)?;
        let body = workflow::generate(task, &names.job_spec, &self.runtime, &self.metadata_store);
        self.artifacts.write(&names, &spec, &body).await?;
        tracing::info!(
            target: "syncflow.orchestrator",
            task_id = task.id, job_spec = %names.job_spec, workflow = %names.workflow,
            "artifacts written"
        );
        Ok(names)
    }

    /// Creates a task: all validation happens before any side effect.
    /// If artifact generation fails after the record is persisted, the
    /// record stays and the error is surfaced.
    pub async fn create(&self, draft: TaskDraft) -> Result<u64, OrchestratorError> {
        if self.tasks.get_by_name(&draft.name).await?.is_some() {
            return Err(ValidationError::NameConflict(draft.name).into());
        }
        let source = self.resolve(draft.source_id).await?;
        let target = self.resolve(draft.target_id).await?;
        // Source must have a reader kind; every connector can be a sink.
        jobspec::reader_kind(source.connector_type)?;

        let incremental = match draft.mode {
            SyncMode::Incremental => Some(
                draft
                    .incremental
                    .ok_or(ValidationError::MissingIncrementalSpec)?,
            ),
            SyncMode::Full => None,
        };
        let last_watermark = incremental
            .as_ref()
            .map(|spec| spec.column_type.default_watermark().to_string());

        let now = chrono::Utc::now();
        let task = self
            .tasks
            .create(SyncTask {
                id: 0,
                name: draft.name,
                mode: draft.mode,
                source: Endpoint {
                    connection_id: source.id,
                    connector_type: source.connector_type,
                    table: draft.source_table,
                },
                target: Endpoint {
                    connection_id: target.id,
                    connector_type: target.connector_type,
                    table: draft.target_table,
                },
                schedule: draft.schedule,
                incremental,
                last_watermark,
                columns: draft.columns,
                status: draft.status,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let _guard = self.lock_task(task.id).await;
        self.write_artifacts(&task, &source, &target).await?;
        Ok(task.id)
    }

    /// Applies a partial update. The record is persisted first; artifacts
    /// are regenerated only when a critical field changed, and stale-named
    /// old files are removed only after the new pair is on disk.
    pub async fn update(&self, id: u64, patch: TaskPatch) -> Result<SyncTask, OrchestratorError> {
        let _guard = self.lock_task(id).await;

        let existing = self
            .tasks
            .get(id)
            .await?
            .ok_or(ValidationError::NotFound(id))?;
        let mut updated = existing.clone();

        if let Some(sid) = patch.source_id {
            let conn = self.resolve(sid).await?;
            updated.source.connection_id = conn.id;
            updated.source.connector_type = conn.connector_type;
        }
        if let Some(tid) = patch.target_id {
            let conn = self.resolve(tid).await?;
            updated.target.connection_id = conn.id;
            updated.target.connector_type = conn.connector_type;
        }
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(table) = patch.source_table {
            updated.source.table = table;
        }
        if let Some(table) = patch.target_table {
            updated.target.table = table;
        }
        if let Some(schedule) = patch.schedule {
            updated.schedule = schedule;
        }
        if let Some(mode) = patch.mode {
            updated.mode = mode;
        }
        if let Some(spec) = patch.incremental {
            updated.incremental = Some(spec);
        }
        if let Some(columns) = patch.columns {
            updated.columns = columns;
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }

        match updated.mode {
            SyncMode::Full => {
                updated.incremental = None;
                updated.last_watermark = None;
            }
            SyncMode::Incremental => {
                let spec = updated
                    .incremental
                    .as_ref()
                    .ok_or(ValidationError::MissingIncrementalSpec)?;
                let newly_enabled = existing.mode == SyncMode::Full;
                let type_changed = existing
                    .incremental
                    .as_ref()
                    .map(|old| old.column_type != spec.column_type)
                    .unwrap_or(true);
                if newly_enabled || type_changed {
                    updated.last_watermark =
                        Some(spec.column_type.default_watermark().to_string());
                }
            }
        }

        jobspec::reader_kind(updated.source.connector_type)?;

        let regenerate = existing.critical_fields_differ(&updated);
        let updated = self.tasks.update(updated).await?;

        if regenerate {
            let source = self.resolve(updated.source.connection_id).await?;
            let target = self.resolve(updated.target.connection_id).await?;
            let new_names = self.write_artifacts(&updated, &source, &target).await?;

            let old_names = ArtifactNames::for_task(
                existing.id,
                existing.source.connector_type,
                existing.target.connector_type,
            );
            if old_names != new_names {
                self.artifacts.remove(&old_names).await?;
                tracing::info!(
                    target: "syncflow.orchestrator",
                    task_id = id, old_workflow = %old_names.workflow,
                    "stale artifacts removed after connector type change"
                );
            }
        }

        Ok(updated)
    }

    /// Removes both artifacts (missing files tolerated), then the record.
    pub async fn delete(&self, id: u64) -> Result<(), OrchestratorError> {
        let _guard = self.lock_task(id).await;

        let task = self
            .tasks
            .get(id)
            .await?
            .ok_or(ValidationError::NotFound(id))?;
        let names = ArtifactNames::for_task(
            task.id,
            task.source.connector_type,
            task.target.connector_type,
        );
        self.artifacts.remove(&names).await?;
        self.tasks.delete(id).await?;
        tracing::info!(target: "syncflow.orchestrator", task_id = id, "task deleted");
        Ok(())
    }

    /// Starts the task's workflow: waits for scheduler registration
    /// (unpausing if needed), then triggers one run. Task status is never
    /// mutated here; a disabled task is refused before any scheduler call.
    pub async fn start(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<RunHandle, OrchestratorError> {
        let _guard = self.lock_task(id).await;

        let task = self
            .tasks
            .get(id)
            .await?
            .ok_or(ValidationError::NotFound(id))?;
        if task.status != TaskStatus::Enabled {
            return Err(ValidationError::TaskDisabled(id).into());
        }

        let workflow_id = workflow::workflow_id(
            task.id,
            task.source.connector_type,
            task.target.connector_type,
        );
        wait_for_registration(self.scheduler.as_ref(), &workflow_id, &self.poll, cancel).await?;

        let run_id = self.scheduler.trigger_run(&workflow_id).await?;
        tracing::info!(
            target: "syncflow.orchestrator",
            task_id = id, %workflow_id, %run_id, "run triggered"
        );
        Ok(RunHandle {
            run_id,
            state: RunState::Queued,
        })
    }

    /// Cancels all running runs of the task's workflow. Cancellations are
    /// single-shot; individual failures reduce the stopped count instead
    /// of aborting the sweep. Task status is never mutated.
    pub async fn stop(&self, id: u64) -> Result<StopOutcome, OrchestratorError> {
        let _guard = self.lock_task(id).await;

        let task = self
            .tasks
            .get(id)
            .await?
            .ok_or(ValidationError::NotFound(id))?;
        let workflow_id = workflow::workflow_id(
            task.id,
            task.source.connector_type,
            task.target.connector_type,
        );

        let runs = self
            .scheduler
            .list_runs(&workflow_id, RunState::Running)
            .await?;
        if runs.is_empty() {
            return Ok(StopOutcome {
                stopped: 0,
                total: 0,
            });
        }

        let total = runs.len();
        let cancels = runs
            .iter()
            .map(|run_id| self.scheduler.cancel_run(&workflow_id, run_id));
        let mut stopped = 0;
        for (run_id, result) in runs.iter().zip(futures::future::join_all(cancels).await) {
            match result {
                Ok(()) => stopped += 1,
                Err(e) => {
                    tracing::warn!(
                        target: "syncflow.orchestrator",
                        task_id = id, %workflow_id, %run_id, error = %e,
                        "run cancellation failed"
                    );
                }
            }
        }
        Ok(StopOutcome { stopped, total })
    }

    /// Task detail with resolved connection names. Connections that no
    /// longer resolve yield `None` names rather than an error.
    pub async fn get(&self, id: u64) -> Result<TaskDetail, OrchestratorError> {
        let task = self
            .tasks
            .get(id)
            .await?
            .ok_or(ValidationError::NotFound(id))?;
        self.detail(task).await
    }

    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskDetail>, OrchestratorError> {
        let mut out = Vec::new();
        for task in self.tasks.list().await? {
            if let Some(status) = filter.status {
                if task.status != status {
                    continue;
                }
            }
            if let Some(mode) = filter.mode {
                if task.mode != mode {
                    continue;
                }
            }
            if let Some(needle) = &filter.name_contains {
                if !task.name.contains(needle.as_str()) {
                    continue;
                }
            }
            if let Some(cid) = filter.connection_id {
                if task.source.connection_id != cid && task.target.connection_id != cid {
                    continue;
                }
            }
            out.push(self.detail(task).await?);
        }
        Ok(out)
    }

    async fn detail(&self, task: SyncTask) -> Result<TaskDetail, OrchestratorError> {
        let source_name = self
            .connections
            .get(task.source.connection_id)
            .await?
            .map(|c| c.name);
        let target_name = self
            .connections
            .get(task.target.connection_id)
            .await?
            .map(|c| c.name);
        Ok(TaskDetail {
            task,
            source_name,
            target_name,
        })
    }
}
