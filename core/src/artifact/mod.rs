//! On-disk artifact management.
//!
//! Both generated artifacts live at deterministic paths keyed by task id
//! and connector type tokens. The scheduler polls the workflows directory,
//! so every write goes through a temp file + rename in the destination
//! directory and a concurrent reader never observes a half-written file.

use std::path::{Path, PathBuf};

use crate::error::ArtifactError;
use crate::jobspec::JobSpec;
use crate::task::ConnectorType;

/// Filenames of the artifact pair for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub job_spec: String,
    pub workflow: String,
}

impl ArtifactNames {
    pub fn for_task(task_id: u64, source: ConnectorType, target: ConnectorType) -> Self {
        let src = source.token();
        let tgt = target.token();
        Self {
            job_spec: format!("collect_{task_id}_{src}_{tgt}.json"),
            workflow: format!("dag_task_{task_id}_{src}_{tgt}.py"),
        }
    }
}

pub struct ArtifactStore {
    jobs_dir: PathBuf,
    workflows_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates the store, ensuring both directories exist.
    pub fn new(
        jobs_dir: impl Into<PathBuf>,
        workflows_dir: impl Into<PathBuf>,
    ) -> Result<Self, ArtifactError> {
        let jobs_dir = jobs_dir.into();
        let workflows_dir = workflows_dir.into();
        for dir in [&jobs_dir, &workflows_dir] {
            std::fs::create_dir_all(dir).map_err(|source| ArtifactError::Io {
                path: dir.display().to_string(),
                source,
            })?;
        }
        Ok(Self {
            jobs_dir,
            workflows_dir,
        })
    }

    pub fn job_spec_path(&self, names: &ArtifactNames) -> PathBuf {
        self.jobs_dir.join(&names.job_spec)
    }

    pub fn workflow_path(&self, names: &ArtifactNames) -> PathBuf {
        self.workflows_dir.join(&names.workflow)
    }

    /// Writes both artifacts. The job spec lands first: the scheduler may
    /// pick up the workflow definition the moment it is renamed into
    /// place, and by then its job-spec reference must resolve.
    pub async fn write(
        &self,
        names: &ArtifactNames,
        spec: &JobSpec,
        workflow_body: &str,
    ) -> Result<(), ArtifactError> {
        let json = serde_json::to_string_pretty(spec)
            .map_err(|e| ArtifactError::Render(e.to_string()))?;
        write_atomic(&self.job_spec_path(names), &json).await?;
        write_atomic(&self.workflow_path(names), workflow_body).await?;
        Ok(())
    }

    /// Removes both artifacts. A missing file is success, not an error;
    /// delete and stale-name cleanup share this path.
    pub async fn remove(&self, names: &ArtifactNames) -> Result<(), ArtifactError> {
        remove_quiet(&self.job_spec_path(names)).await?;
        remove_quiet(&self.workflow_path(names)).await?;
        Ok(())
    }
}

async fn write_atomic(path: &Path, contents: &str) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact".to_string());
    let tmp = path.with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()));
    tokio::fs::write(&tmp, contents).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

async fn remove_quiet(path: &Path) -> Result<(), ArtifactError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ArtifactError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}
