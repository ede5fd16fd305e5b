//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `syncflow_core::api` instead of reaching into
//! internal modules.

pub use crate::artifact::{ArtifactNames, ArtifactStore};
pub use crate::config::{
    get_data_dir, load_default, load_from_path, AppConfig, ArtifactsConfig, LoggingConfig,
    MetadataStoreConfig, RuntimeConfig, SchedulerConfig,
};
pub use crate::error::{
    ArtifactError, CliError, OrchestratorError, SchedulerError, ValidationError,
};
pub use crate::jobspec::{JobEndpoint, JobLimits, JobParameters, JobSpec};
pub use crate::orchestrator::{TaskDetail, TaskFilter, TaskOrchestrator};
pub use crate::scheduler::{
    wait_for_registration, HttpSchedulerClient, RegistrationPoll, RunHandle, RunState,
    SchedulerApi, StopOutcome, WorkflowStatus,
};
pub use crate::store::{
    ConnectionResolver, FileTaskStore, MemoryConnectionResolver, MemoryTaskStore, StoreError,
    TaskRecordStore,
};
pub use crate::task::{
    ConnectionInfo, ConnectorType, Endpoint, IncrementalColumnType, IncrementalSpec, SyncMode,
    SyncTask, TaskDraft, TaskPatch, TaskStatus,
};
pub use crate::workflow::workflow_id;
