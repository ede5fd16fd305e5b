//! Create/update/delete lifecycle: validation ordering, watermark
//! bookkeeping, and artifact (re)generation.

mod common;

use common::{full_draft, harness, incremental_draft, StubScheduler};
use pretty_assertions::assert_eq;

use syncflow_core::api::{
    IncrementalColumnType, IncrementalSpec, JobSpec, OrchestratorError, SyncMode, TaskPatch,
    TaskRecordStore, ValidationError,
};

fn dir_entries(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn create_incremental_task_writes_both_artifacts() {
    let h = harness(StubScheduler::new(vec![]));
    let id = h.orchestrator.create(incremental_draft("t1")).await.unwrap();

    let task = h.orchestrator.get(id).await.unwrap().task;
    assert_eq!(task.last_watermark.as_deref(), Some("0"));

    let job_path = h.jobs_dir.join(format!("collect_{id}_mysql_postgresql.json"));
    let dag_path = h
        .workflows_dir
        .join(format!("dag_task_{id}_mysql_postgresql.py"));
    assert!(job_path.exists());
    assert!(dag_path.exists());

    let spec: JobSpec = serde_json::from_str(&std::fs::read_to_string(&job_path).unwrap()).unwrap();
    assert_eq!(
        spec.reader.parameters.predicate.as_deref(),
        Some("id > '${lastWatermark}'")
    );
    assert_eq!(spec.reader.kind, "mysqlreader");
    assert_eq!(spec.writer.kind, "postgresqlwriter");

    let dag = std::fs::read_to_string(&dag_path).unwrap();
    assert!(dag.contains(&format!("dag_id=\"task_{id}_mysql_postgresql\"")));
    assert!(dag.contains("schedule_interval=\"*/5 * * * *\""));
}

#[tokio::test]
async fn datetime_and_date_watermark_defaults() {
    let h = harness(StubScheduler::new(vec![]));

    let mut draft = incremental_draft("dt");
    draft.incremental = Some(IncrementalSpec {
        column: "updated_at".into(),
        column_type: IncrementalColumnType::Datetime,
    });
    let id = h.orchestrator.create(draft).await.unwrap();
    let task = h.orchestrator.get(id).await.unwrap().task;
    assert_eq!(task.last_watermark.as_deref(), Some("1970-01-01 00:00:00"));

    let mut draft = incremental_draft("d");
    draft.incremental = Some(IncrementalSpec {
        column: "day".into(),
        column_type: IncrementalColumnType::Date,
    });
    let id = h.orchestrator.create(draft).await.unwrap();
    let task = h.orchestrator.get(id).await.unwrap().task;
    assert_eq!(task.last_watermark.as_deref(), Some("1970-01-01"));
}

#[tokio::test]
async fn duplicate_name_fails_before_any_side_effect() {
    let h = harness(StubScheduler::new(vec![]));
    h.orchestrator.create(full_draft("t1")).await.unwrap();
    let before = dir_entries(&h.jobs_dir);

    let err = h.orchestrator.create(full_draft("t1")).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Validation(ValidationError::NameConflict(_))
    ));
    assert_eq!(dir_entries(&h.jobs_dir), before);
}

#[tokio::test]
async fn unknown_connection_fails_without_persisting() {
    let h = harness(StubScheduler::new(vec![]));
    let mut draft = full_draft("t1");
    draft.target_id = 99;

    let err = h.orchestrator.create(draft).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Validation(ValidationError::UnknownConnection(99))
    ));
    assert!(h.tasks.list().await.unwrap().is_empty());
    assert!(dir_entries(&h.jobs_dir).is_empty());
}

#[tokio::test]
async fn kafka_source_is_rejected() {
    let h = harness(StubScheduler::new(vec![]));
    let mut draft = full_draft("t1");
    draft.source_id = 4; // kafka

    let err = h.orchestrator.create(draft).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Validation(ValidationError::UnsupportedConnectorType { .. })
    ));
    assert!(h.tasks.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn incremental_mode_without_spec_is_rejected() {
    let h = harness(StubScheduler::new(vec![]));
    let mut draft = incremental_draft("t1");
    draft.incremental = None;

    let err = h.orchestrator.create(draft).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Validation(ValidationError::MissingIncrementalSpec)
    ));
}

#[tokio::test]
async fn non_critical_update_leaves_artifacts_untouched() {
    let h = harness(StubScheduler::new(vec![]));
    let id = h.orchestrator.create(incremental_draft("t1")).await.unwrap();

    // Plant a sentinel: if regeneration happened, it would be overwritten.
    let job_path = h.jobs_dir.join(format!("collect_{id}_mysql_postgresql.json"));
    std::fs::write(&job_path, "sentinel").unwrap();

    let patch = TaskPatch {
        name: Some("t1-renamed".into()),
        ..TaskPatch::default()
    };
    let updated = h.orchestrator.update(id, patch).await.unwrap();
    assert_eq!(updated.name, "t1-renamed");
    assert_eq!(std::fs::read_to_string(&job_path).unwrap(), "sentinel");
}

#[tokio::test]
async fn source_table_update_regenerates_under_same_workflow_id() {
    let h = harness(StubScheduler::new(vec![]));
    let id = h.orchestrator.create(incremental_draft("t1")).await.unwrap();

    let job_path = h.jobs_dir.join(format!("collect_{id}_mysql_postgresql.json"));
    std::fs::write(&job_path, "sentinel").unwrap();

    let patch = TaskPatch {
        source_table: Some("orders_v2".into()),
        ..TaskPatch::default()
    };
    h.orchestrator.update(id, patch).await.unwrap();

    // Same connector types, so the same filenames, regenerated in place.
    let spec: JobSpec = serde_json::from_str(&std::fs::read_to_string(&job_path).unwrap()).unwrap();
    assert_eq!(spec.reader.parameters.table, "orders_v2");
    assert_eq!(dir_entries(&h.jobs_dir).len(), 1);
}

#[tokio::test]
async fn connector_type_change_renames_artifacts_and_removes_old() {
    let h = harness(StubScheduler::new(vec![]));
    let id = h.orchestrator.create(full_draft("t1")).await.unwrap();

    let old_job = h.jobs_dir.join(format!("collect_{id}_mysql_postgresql.json"));
    assert!(old_job.exists());

    // Retarget to the mongo connection: target connector type changes.
    let patch = TaskPatch {
        target_id: Some(3),
        ..TaskPatch::default()
    };
    let updated = h.orchestrator.update(id, patch).await.unwrap();
    assert_eq!(updated.target.connection_id, 3);

    let new_job = h.jobs_dir.join(format!("collect_{id}_mysql_mongodb.json"));
    let new_dag = h
        .workflows_dir
        .join(format!("dag_task_{id}_mysql_mongodb.py"));
    assert!(new_job.exists());
    assert!(new_dag.exists());
    assert!(!old_job.exists());
    assert!(!h
        .workflows_dir
        .join(format!("dag_task_{id}_mysql_postgresql.py"))
        .exists());
}

#[tokio::test]
async fn enabling_incremental_resets_watermark() {
    let h = harness(StubScheduler::new(vec![]));
    let id = h.orchestrator.create(full_draft("t1")).await.unwrap();

    let patch = TaskPatch {
        mode: Some(SyncMode::Incremental),
        incremental: Some(IncrementalSpec {
            column: "updated_at".into(),
            column_type: IncrementalColumnType::Datetime,
        }),
        ..TaskPatch::default()
    };
    let updated = h.orchestrator.update(id, patch).await.unwrap();
    assert_eq!(
        updated.last_watermark.as_deref(),
        Some("1970-01-01 00:00:00")
    );
}

#[tokio::test]
async fn column_type_change_resets_watermark() {
    let h = harness(StubScheduler::new(vec![]));
    let id = h.orchestrator.create(incremental_draft("t1")).await.unwrap();

    // Simulate runner progress so the reset is observable.
    let mut task = h.tasks.get(id).await.unwrap().unwrap();
    task.last_watermark = Some("41992".into());
    h.tasks.update(task).await.unwrap();

    let patch = TaskPatch {
        incremental: Some(IncrementalSpec {
            column: "id".into(),
            column_type: IncrementalColumnType::Date,
        }),
        ..TaskPatch::default()
    };
    let updated = h.orchestrator.update(id, patch).await.unwrap();
    assert_eq!(updated.last_watermark.as_deref(), Some("1970-01-01"));
}

#[tokio::test]
async fn switching_to_full_clears_incremental_state() {
    let h = harness(StubScheduler::new(vec![]));
    let id = h.orchestrator.create(incremental_draft("t1")).await.unwrap();

    let patch = TaskPatch {
        mode: Some(SyncMode::Full),
        ..TaskPatch::default()
    };
    let updated = h.orchestrator.update(id, patch).await.unwrap();
    assert_eq!(updated.incremental, None);
    assert_eq!(updated.last_watermark, None);
}

#[tokio::test]
async fn delete_removes_artifacts_and_record() {
    let h = harness(StubScheduler::new(vec![]));
    let id = h.orchestrator.create(full_draft("t1")).await.unwrap();

    h.orchestrator.delete(id).await.unwrap();
    assert!(dir_entries(&h.jobs_dir).is_empty());
    assert!(dir_entries(&h.workflows_dir).is_empty());
    assert!(h.tasks.get(id).await.unwrap().is_none());

    // Repeat delete: the record is gone.
    let err = h.orchestrator.delete(id).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Validation(ValidationError::NotFound(_))
    ));
}

#[tokio::test]
async fn delete_tolerates_already_missing_artifacts() {
    let h = harness(StubScheduler::new(vec![]));
    let id = h.orchestrator.create(full_draft("t1")).await.unwrap();

    std::fs::remove_file(h.jobs_dir.join(format!("collect_{id}_mysql_postgresql.json"))).unwrap();
    h.orchestrator.delete(id).await.unwrap();
}

#[tokio::test]
async fn list_filters_and_joins_connection_names() {
    let h = harness(StubScheduler::new(vec![]));
    h.orchestrator.create(incremental_draft("inc")).await.unwrap();
    h.orchestrator.create(full_draft("full")).await.unwrap();

    let all = h
        .orchestrator
        .list(&syncflow_core::api::TaskFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].source_name.as_deref(), Some("orders-mysql"));
    assert_eq!(all[0].target_name.as_deref(), Some("warehouse-pg"));

    let only_inc = h
        .orchestrator
        .list(&syncflow_core::api::TaskFilter {
            mode: Some(SyncMode::Incremental),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(only_inc.len(), 1);
    assert_eq!(only_inc[0].task.name, "inc");
}
