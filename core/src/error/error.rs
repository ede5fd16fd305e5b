use thiserror::Error;

use super::scheduler::SchedulerError;
use crate::store::StoreError;
use crate::task::ConnectorType;

/// Failures detected before any side effect. A validation error never
/// leaves a partial record or artifact behind.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("sync task name already exists: {0}")]
    NameConflict(String),
    #[error("unknown connection id: {0}")]
    UnknownConnection(u64),
    #[error("unknown connector type: {0}")]
    UnknownConnectorType(String),
    #[error("connector type {connector} cannot be used as {role}")]
    UnsupportedConnectorType {
        connector: ConnectorType,
        role: &'static str,
    },
    #[error("unsupported incremental column type: {0}")]
    UnsupportedIncrementalType(String),
    #[error("incremental mode requires an incremental column and column type")]
    MissingIncrementalSpec,
    #[error("sync task not found: {0}")]
    NotFound(u64),
    #[error("sync task {0} is disabled")]
    TaskDisabled(u64),
}

/// Artifact render/IO failures. These can occur *after* the task record
/// has been persisted; the record is not rolled back (the caller sees the
/// error and the record/artifact pair may be temporarily inconsistent).
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact render failed: {0}")]
    Render(String),
    #[error("artifact io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Umbrella error for orchestrator operations.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
    #[error("record store error: {0}")]
    Store(#[from] StoreError),
}
