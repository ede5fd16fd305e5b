//! External workflow scheduler integration.
//!
//! The scheduler discovers workflow definitions from a watched directory
//! with some lag; `poll` compensates by polling the control API until a
//! freshly written definition is registered. `client` is the thin HTTP
//! wrapper over the scheduler's wire API.

pub mod client;
pub mod poll;

pub use client::HttpSchedulerClient;
pub use poll::{wait_for_registration, RegistrationPoll};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// Registration state of a workflow as the scheduler reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowStatus {
    pub paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Queued => "queued",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
            RunState::Canceled => "canceled",
        }
    }
}

/// A scheduler-tracked execution instance. Transient: obtained and
/// released within a single start()/stop() call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHandle {
    pub run_id: String,
    pub state: RunState,
}

/// Outcome of a stop() call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopOutcome {
    /// Runs successfully canceled.
    pub stopped: usize,
    /// Running runs found.
    pub total: usize,
}

/// Wire API of the external scheduler. Every call carries an explicit
/// timeout and returns a typed failure instead of panicking on transport
/// errors.
#[async_trait]
pub trait SchedulerApi: Send + Sync {
    /// `Ok(None)` means the scheduler does not know the workflow (yet).
    async fn get_status(&self, workflow_id: &str)
        -> Result<Option<WorkflowStatus>, SchedulerError>;

    async fn set_paused(&self, workflow_id: &str, paused: bool) -> Result<(), SchedulerError>;

    /// Triggers a run and returns its id. Single-shot: failures are
    /// reported, never retried.
    async fn trigger_run(&self, workflow_id: &str) -> Result<String, SchedulerError>;

    async fn list_runs(
        &self,
        workflow_id: &str,
        state: RunState,
    ) -> Result<Vec<String>, SchedulerError>;

    /// Single-shot, like `trigger_run`.
    async fn cancel_run(&self, workflow_id: &str, run_id: &str) -> Result<(), SchedulerError>;
}
