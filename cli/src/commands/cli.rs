use clap::{Args as ClapArgs, Parser, Subcommand};

use syncflow_core::api::{SyncMode, TaskStatus};

#[derive(Parser, Debug)]
#[command(
    name = "syncflow",
    version,
    about = "Manage data-sync tasks, their generated artifacts, and scheduler runs"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path. Defaults to ~/.syncflow/config.toml, then
    /// ./config.toml, then built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CreateArgs {
    /// TOML file describing the task to create.
    #[arg(long)]
    pub file: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct UpdateArgs {
    pub id: u64,

    /// TOML file with the fields to change; absent fields keep their
    /// stored values.
    #[arg(long)]
    pub file: String,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum StatusArg {
    Enabled,
    Disabled,
}

impl From<StatusArg> for TaskStatus {
    fn from(v: StatusArg) -> Self {
        match v {
            StatusArg::Enabled => TaskStatus::Enabled,
            StatusArg::Disabled => TaskStatus::Disabled,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    Full,
    Incremental,
}

impl From<ModeArg> for SyncMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Full => SyncMode::Full,
            ModeArg::Incremental => SyncMode::Incremental,
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Substring match on the task name.
    #[arg(long)]
    pub name: Option<String>,

    /// Only tasks referencing this connection id on either side.
    #[arg(long)]
    pub connection: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a task and generate its job-spec and workflow artifacts.
    Create(CreateArgs),
    /// Apply a partial update; artifacts regenerate when a critical field
    /// changed.
    Update(UpdateArgs),
    /// Delete a task and remove its artifacts.
    Delete { id: u64 },
    /// Trigger one run, waiting for scheduler registration first.
    /// Ctrl-C aborts the registration wait.
    Start { id: u64 },
    /// Cancel all running runs of the task's workflow.
    Stop { id: u64 },
    /// Show one task with resolved connection names.
    Get { id: u64 },
    /// List tasks.
    List(ListArgs),
}
