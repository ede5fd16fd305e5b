//! syncflow-core: sync-task orchestration.
//!
//! Turns recurring data-synchronization task definitions into a job-spec
//! artifact for a generic ETL runner and a workflow definition for an
//! external scheduler, and drives the task lifecycle (create / update /
//! delete / start / stop) against that scheduler's HTTP control API.

pub mod api;
pub mod artifact;
pub mod config;
pub mod error;
pub mod jobspec;
pub mod orchestrator;
pub mod scheduler;
pub mod store;
pub mod task;
pub mod workflow;
