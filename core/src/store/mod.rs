//! Narrow persistence interfaces consumed by the orchestrator.
//!
//! The record store and connection resolver are external collaborators;
//! this module defines the seams plus two concrete backings: an in-memory
//! store (tests, embedding) and a JSON-file store (the CLI).

pub mod file;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::task::{ConnectionInfo, SyncTask};

pub use file::FileTaskStore;
pub use memory::{MemoryConnectionResolver, MemoryTaskStore};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(u64),
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Persistence seam for sync-task records.
///
/// `create` assigns the id and both timestamps; `update` bumps
/// `updated_at`. The orchestrator treats everything else as opaque.
#[async_trait]
pub trait TaskRecordStore: Send + Sync {
    async fn get(&self, id: u64) -> Result<Option<SyncTask>, StoreError>;
    async fn get_by_name(&self, name: &str) -> Result<Option<SyncTask>, StoreError>;
    /// Persists `task`, overwriting `id`/`created_at`/`updated_at`.
    async fn create(&self, task: SyncTask) -> Result<SyncTask, StoreError>;
    async fn update(&self, task: SyncTask) -> Result<SyncTask, StoreError>;
    async fn delete(&self, id: u64) -> Result<(), StoreError>;
    async fn list(&self) -> Result<Vec<SyncTask>, StoreError>;
}

/// Lookup seam for connector metadata.
#[async_trait]
pub trait ConnectionResolver: Send + Sync {
    async fn get(&self, id: u64) -> Result<Option<ConnectionInfo>, StoreError>;
}
