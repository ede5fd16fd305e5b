use clap::Parser;
mod commands;
use commands::cli;

use std::path::Path;
use std::sync::Arc;

use syncflow_core::api as core_api;
use syncflow_core::error::{CliError, OrchestratorError};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();

    let cfg = match &args.config {
        Some(path) => core_api::load_from_path(Path::new(path)),
        None => core_api::load_default(),
    }
    .map_err(|e| CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(CliError::Config)?;
    tracing::debug!(
        jobs_dir = %cfg.artifacts.jobs_dir,
        workflows_dir = %cfg.artifacts.workflows_dir,
        scheduler = %cfg.scheduler.base_url,
        "config loaded"
    );

    let orchestrator = build_orchestrator(&cfg).await?;
    dispatch(args.command, &orchestrator).await
}

async fn build_orchestrator(
    cfg: &core_api::AppConfig,
) -> Result<core_api::TaskOrchestrator, CliError> {
    let tasks = Arc::new(
        core_api::FileTaskStore::open(&cfg.artifacts.task_db)
            .await
            .map_err(OrchestratorError::from)?,
    );
    let connections = Arc::new(core_api::MemoryConnectionResolver::with(
        cfg.connections.clone(),
    ));
    let artifacts =
        core_api::ArtifactStore::new(&cfg.artifacts.jobs_dir, &cfg.artifacts.workflows_dir)
            .map_err(OrchestratorError::from)?;
    let scheduler = Arc::new(
        core_api::HttpSchedulerClient::new(&cfg.scheduler).map_err(OrchestratorError::from)?,
    );
    let poll = core_api::RegistrationPoll {
        max_attempts: cfg.scheduler.registration_max_attempts,
        interval: std::time::Duration::from_secs(cfg.scheduler.registration_interval_secs),
    };

    Ok(core_api::TaskOrchestrator::new(
        tasks,
        connections,
        artifacts,
        scheduler,
        cfg.limits,
        cfg.runtime.clone(),
        cfg.metadata_store.clone(),
        poll,
    ))
}

async fn dispatch(
    cmd: cli::Commands,
    orchestrator: &core_api::TaskOrchestrator,
) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Create(a) => {
            let draft: core_api::TaskDraft = read_toml(&a.file)?;
            let id = orchestrator.create(draft).await?;
            print_json(&orchestrator.get(id).await?)?;
            Ok(0)
        }
        cli::Commands::Update(a) => {
            let patch: core_api::TaskPatch = read_toml(&a.file)?;
            let task = orchestrator.update(a.id, patch).await?;
            print_json(&task)?;
            Ok(0)
        }
        cli::Commands::Delete { id } => {
            orchestrator.delete(id).await?;
            Ok(0)
        }
        cli::Commands::Start { id } => {
            // Ctrl-C aborts the registration poll instead of killing the
            // process mid-request.
            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });
            let handle = orchestrator.start(id, &cancel).await?;
            print_json(&handle)?;
            Ok(0)
        }
        cli::Commands::Stop { id } => {
            let outcome = orchestrator.stop(id).await?;
            print_json(&outcome)?;
            Ok(0)
        }
        cli::Commands::Get { id } => {
            print_json(&orchestrator.get(id).await?)?;
            Ok(0)
        }
        cli::Commands::List(a) => {
            let filter = core_api::TaskFilter {
                status: a.status.map(Into::into),
                mode: a.mode.map(Into::into),
                name_contains: a.name,
                connection_id: a.connection,
            };
            print_json(&orchestrator.list(&filter).await?)?;
            Ok(0)
        }
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| CliError::Input(format!("{path}: {e}")))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?;
    println!("{out}");
    Ok(())
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 12: request refused by validation / bad input
    // 20: store or artifact IO error
    // 30: scheduler failure
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Input(_) => 12,
        CliError::Orchestrator(oe) => match oe {
            OrchestratorError::Validation(_) => 12,
            OrchestratorError::Artifact(_) | OrchestratorError::Store(_) => 20,
            OrchestratorError::Scheduler(_) => 30,
        },
        CliError::Io(_) => 20,
        CliError::Anyhow(_) => 50,
    }
}

fn init_tracing(logging: &core_api::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("syncflow"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("syncflow.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
