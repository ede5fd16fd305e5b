pub mod types;

pub use types::{
    ConnectionInfo, ConnectorType, Endpoint, IncrementalColumnType, IncrementalSpec, SyncMode,
    SyncTask, TaskDraft, TaskPatch, TaskStatus,
};
