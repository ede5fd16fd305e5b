use thiserror::Error;

use super::error::OrchestratorError;

/// Top-level error for the operator CLI. Each variant maps to a distinct
/// process exit code in the binary.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    Input(String),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
