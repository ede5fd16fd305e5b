use serde::{Deserialize, Serialize};

use crate::jobspec::JobLimits;
use crate::task::ConnectionInfo;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Watermark/metadata store the runner commits incremental state to.
    /// Embedded into incremental workflow definitions; never read from
    /// task records.
    #[serde(default)]
    pub metadata_store: MetadataStoreConfig,

    #[serde(default)]
    pub limits: JobLimits,

    /// Connections available to the CLI's connection resolver.
    #[serde(default)]
    pub connections: Vec<ConnectionInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "syncflow_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Where generated artifacts and the CLI task store live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_jobs_dir")]
    pub jobs_dir: String,

    #[serde(default = "default_workflows_dir")]
    pub workflows_dir: String,

    #[serde(default = "default_task_db")]
    pub task_db: String,
}

fn default_jobs_dir() -> String {
    "./artifacts/jobs".to_string()
}

fn default_workflows_dir() -> String {
    "./artifacts/dags".to_string()
}

fn default_task_db() -> String {
    "./artifacts/tasks.json".to_string()
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            jobs_dir: default_jobs_dir(),
            workflows_dir: default_workflows_dir(),
            task_db: default_task_db(),
        }
    }
}

/// External scheduler endpoint + registration-poll tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_scheduler_base_url")]
    pub base_url: String,

    #[serde(default = "default_scheduler_username")]
    pub username: String,

    #[serde(default)]
    pub secret: String,

    /// Per-request timeout, clamped to 10..=30 seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_registration_max_attempts")]
    pub registration_max_attempts: u32,

    #[serde(default = "default_registration_interval_secs")]
    pub registration_interval_secs: u64,
}

fn default_scheduler_base_url() -> String {
    "http://127.0.0.1:8080/api/v1".to_string()
}

fn default_scheduler_username() -> String {
    "admin".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_registration_max_attempts() -> u32 {
    10
}

fn default_registration_interval_secs() -> u64 {
    3
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            base_url: default_scheduler_base_url(),
            username: default_scheduler_username(),
            secret: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            registration_max_attempts: default_registration_max_attempts(),
            registration_interval_secs: default_registration_interval_secs(),
        }
    }
}

/// Fixed identity of the ETL runner referenced by workflow definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_runtime_image")]
    pub image: String,

    #[serde(default = "default_network_id")]
    pub network_id: String,
}

fn default_runtime_image() -> String {
    "datax-runner:1.2".to_string()
}

fn default_network_id() -> String {
    "data_platform_net".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            image: default_runtime_image(),
            network_id: default_network_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataStoreConfig {
    #[serde(default = "default_meta_host")]
    pub host: String,

    #[serde(default = "default_meta_port")]
    pub port: u16,

    #[serde(default = "default_meta_database")]
    pub database: String,

    #[serde(default = "default_meta_user")]
    pub user: String,

    #[serde(default)]
    pub secret: String,
}

fn default_meta_host() -> String {
    "127.0.0.1".to_string()
}

fn default_meta_port() -> u16 {
    3306
}

fn default_meta_database() -> String {
    "sync_meta".to_string()
}

fn default_meta_user() -> String {
    "syncflow".to_string()
}

impl Default for MetadataStoreConfig {
    fn default() -> Self {
        Self {
            host: default_meta_host(),
            port: default_meta_port(),
            database: default_meta_database(),
            user: default_meta_user(),
            secret: String::new(),
        }
    }
}
