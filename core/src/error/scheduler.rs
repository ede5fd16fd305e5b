use thiserror::Error;

/// Scheduler wire-API failures. These never mutate task state; start/stop
/// report them to the caller as operational failures only.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("scheduler unavailable: {0}")]
    Unavailable(String),
    /// Non-success HTTP response.
    #[error("scheduler rejected request (status {status}): {detail}")]
    Rejected { status: u16, detail: String },
    /// Response arrived but did not parse into the expected shape.
    #[error("unexpected scheduler response: {0}")]
    BadResponse(String),
    /// Registration poll exhausted without the workflow appearing.
    #[error("workflow {workflow_id} not registered after {attempts} attempts")]
    RegistrationTimeout { workflow_id: String, attempts: u32 },
    /// The owning request was canceled while polling.
    #[error("scheduler operation canceled")]
    Canceled,
}
