//! JSON-file task store used by the CLI.
//!
//! The whole task map is held in memory and rewritten to disk after every
//! mutation (temp file + rename, so a crash mid-write never truncates the
//! existing state).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{StoreError, TaskRecordStore};
use crate::task::SyncTask;

#[derive(Debug, Default, Serialize, Deserialize)]
struct FileState {
    next_id: u64,
    tasks: BTreeMap<u64, SyncTask>,
}

pub struct FileTaskStore {
    path: PathBuf,
    state: RwLock<FileState>,
}

impl FileTaskStore {
    /// Opens (or initializes) the store at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileState {
                next_id: 1,
                tasks: BTreeMap::new(),
            },
            Err(e) => return Err(StoreError::Io(e)),
        };
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    async fn persist(&self, state: &FileState) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }
        let raw = serde_json::to_string_pretty(state)?;
        let tmp = sibling_temp(&self.path);
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn sibling_temp(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "store".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()))
}

#[async_trait]
impl TaskRecordStore for FileTaskStore {
    async fn get(&self, id: u64) -> Result<Option<SyncTask>, StoreError> {
        Ok(self.state.read().await.tasks.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<SyncTask>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .tasks
            .values()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn create(&self, mut task: SyncTask) -> Result<SyncTask, StoreError> {
        let mut state = self.state.write().await;
        task.id = state.next_id;
        state.next_id += 1;
        let now = Utc::now();
        task.created_at = now;
        task.updated_at = now;
        state.tasks.insert(task.id, task.clone());
        self.persist(&state).await?;
        Ok(task)
    }

    async fn update(&self, mut task: SyncTask) -> Result<SyncTask, StoreError> {
        let mut state = self.state.write().await;
        if !state.tasks.contains_key(&task.id) {
            return Err(StoreError::NotFound(task.id));
        }
        task.updated_at = Utc::now();
        state.tasks.insert(task.id, task.clone());
        self.persist(&state).await?;
        Ok(task)
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.tasks.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        self.persist(&state).await
    }

    async fn list(&self) -> Result<Vec<SyncTask>, StoreError> {
        Ok(self.state.read().await.tasks.values().cloned().collect())
    }
}
