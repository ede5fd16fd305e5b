use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ConnectionResolver, StoreError, TaskRecordStore};
use crate::task::{ConnectionInfo, SyncTask};

/// In-memory task store. Used in tests and for embedding without a
/// persistent backing.
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<u64, SyncTask>>,
    next_id: AtomicU64,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRecordStore for MemoryTaskStore {
    async fn get(&self, id: u64) -> Result<Option<SyncTask>, StoreError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<SyncTask>, StoreError> {
        Ok(self
            .tasks
            .read()
            .await
            .values()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn create(&self, mut task: SyncTask) -> Result<SyncTask, StoreError> {
        task.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        task.created_at = now;
        task.updated_at = now;
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, mut task: SyncTask) -> Result<SyncTask, StoreError> {
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&task.id) {
            return Err(StoreError::NotFound(task.id));
        }
        task.updated_at = Utc::now();
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        match self.tasks.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn list(&self) -> Result<Vec<SyncTask>, StoreError> {
        let mut all: Vec<SyncTask> = self.tasks.read().await.values().cloned().collect();
        all.sort_by_key(|t| t.id);
        Ok(all)
    }
}

/// Connection resolver over a fixed set (config-declared connections).
#[derive(Default)]
pub struct MemoryConnectionResolver {
    connections: HashMap<u64, ConnectionInfo>,
}

impl MemoryConnectionResolver {
    pub fn with(connections: Vec<ConnectionInfo>) -> Self {
        Self {
            connections: connections.into_iter().map(|c| (c.id, c)).collect(),
        }
    }
}

#[async_trait]
impl ConnectionResolver for MemoryConnectionResolver {
    async fn get(&self, id: u64) -> Result<Option<ConnectionInfo>, StoreError> {
        Ok(self.connections.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ConnectorType, Endpoint, SyncMode, TaskStatus};

    fn record(name: &str) -> SyncTask {
        SyncTask {
            id: 0,
            name: name.into(),
            mode: SyncMode::Full,
            source: Endpoint {
                connection_id: 1,
                connector_type: ConnectorType::MySql,
                table: "a".into(),
            },
            target: Endpoint {
                connection_id: 2,
                connector_type: ConnectorType::PostgreSql,
                table: "b".into(),
            },
            schedule: "@hourly".into(),
            incremental: None,
            last_watermark: None,
            columns: vec![],
            status: TaskStatus::Enabled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryTaskStore::new();
        let a = store.create(record("a")).await.unwrap();
        let b = store.create(record("b")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_missing_record_fails() {
        let store = MemoryTaskStore::new();
        let mut t = record("a");
        t.id = 42;
        assert!(matches!(
            store.update(t).await,
            Err(StoreError::NotFound(42))
        ));
    }

    #[tokio::test]
    async fn lookup_by_name() {
        let store = MemoryTaskStore::new();
        store.create(record("orders")).await.unwrap();
        assert!(store.get_by_name("orders").await.unwrap().is_some());
        assert!(store.get_by_name("other").await.unwrap().is_none());
    }
}
