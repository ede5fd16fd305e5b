pub mod cli;
pub mod error;
pub mod scheduler;

pub use cli::CliError;
pub use error::{ArtifactError, OrchestratorError, ValidationError};
pub use scheduler::SchedulerError;
