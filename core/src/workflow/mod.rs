//! Workflow definition generation.
//!
//! Renders the periodic workflow script the external scheduler discovers
//! from its watched directory. The workflow id is a deterministic
//! composition of task id and connector type tokens, so it stays stable
//! across regenerations until a connector *type* changes, at which point
//! the old definition becomes an orphan the regenerate/delete path must
//! remove explicitly.

use crate::config::{MetadataStoreConfig, RuntimeConfig};
use crate::task::{ConnectorType, SyncMode, SyncTask};

/// Deterministic workflow identity: `task_<id>_<source>_<target>`.
pub fn workflow_id(task_id: u64, source: ConnectorType, target: ConnectorType) -> String {
    format!("task_{task_id}_{}_{}", source.token(), target.token())
}

const DAG_TEMPLATE: &str = r#""""{workflow_id} - generated sync workflow. Do not edit by hand."""
from datetime import datetime

from airflow import DAG
from airflow.providers.docker.operators.docker import DockerOperator

DEFAULT_ARGS = {
    "owner": "syncflow",
    "depends_on_past": False,
    "retries": 0,
}

with DAG(
    dag_id="{workflow_id}",
    description="{description}",
    schedule_interval="{schedule}",
    start_date=datetime(1970, 1, 1),
    catchup=False,
    tags={tags},
    default_args=DEFAULT_ARGS,
) as dag:
    collect = DockerOperator(
        task_id="collect",
        image="{image}",
        network_mode="{network_id}",
        auto_remove=True,
        command="run --job /jobs/{job_spec_file}",
        environment={
{environment}
        },
    )
"#;

/// Renders the workflow definition for `task`.
///
/// `job_spec_file` is the *filename* of the sibling job-spec artifact;
/// the runner mounts the jobs directory and resolves it there. The
/// schedule string is embedded verbatim; validation is the scheduler's
/// problem, not ours. Incremental tasks additionally receive the
/// watermark-store connection so the runner can resolve and commit
/// `${lastWatermark}`.
pub fn generate(
    task: &SyncTask,
    job_spec_file: &str,
    runtime: &RuntimeConfig,
    metadata: &MetadataStoreConfig,
) -> String {
    let id = workflow_id(task.id, task.source.connector_type, task.target.connector_type);

    let mode = match task.mode {
        SyncMode::Full => "full",
        SyncMode::Incremental => "incremental",
    };
    let tags = format!(
        "[\"syncflow\", \"collect\", \"{mode}\", \"{}\", \"{}\"]",
        task.source.connector_type.token(),
        task.target.connector_type.token()
    );

    let mut env = vec![
        ("SYNC_TASK_ID".to_string(), task.id.to_string()),
        (
            "SYNC_INCREMENTAL".to_string(),
            matches!(task.mode, SyncMode::Incremental).to_string(),
        ),
    ];
    if task.mode == SyncMode::Incremental {
        env.push(("META_HOST".into(), metadata.host.clone()));
        env.push(("META_PORT".into(), metadata.port.to_string()));
        env.push(("META_DATABASE".into(), metadata.database.clone()));
        env.push(("META_USER".into(), metadata.user.clone()));
        env.push(("META_SECRET".into(), metadata.secret.clone()));
    }
    let environment = env
        .iter()
        .map(|(k, v)| format!("            \"{k}\": \"{v}\","))
        .collect::<Vec<_>>()
        .join("\n");

    DAG_TEMPLATE
        .replace("{workflow_id}", &id)
        .replace("{description}", &task.name)
        .replace("{schedule}", &task.schedule)
        .replace("{tags}", &tags)
        .replace("{image}", &runtime.image)
        .replace("{network_id}", &runtime.network_id)
        .replace("{job_spec_file}", job_spec_file)
        .replace("{environment}", &environment)
}
