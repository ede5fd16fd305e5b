//! Sync-task data model.
//!
//! `SyncTask` is the persisted record; `TaskDraft`/`TaskPatch` are the
//! create/update inputs the orchestrator accepts. Connector kinds are a
//! closed enum so every dispatch site (reader/writer kind, URL scheme,
//! filename token) is checked exhaustively at compile time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Closed set of supported connector kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    #[serde(rename = "MySQL")]
    MySql,
    #[serde(rename = "PostgreSQL")]
    PostgreSql,
    #[serde(rename = "MongoDB")]
    MongoDb,
    #[serde(rename = "Dameng")]
    Dameng,
    #[serde(rename = "Kafka")]
    Kafka,
    #[serde(rename = "HDFS")]
    Hdfs,
}

impl ConnectorType {
    /// Lowercase token used in workflow ids and artifact filenames.
    pub fn token(&self) -> &'static str {
        match self {
            ConnectorType::MySql => "mysql",
            ConnectorType::PostgreSql => "postgresql",
            ConnectorType::MongoDb => "mongodb",
            ConnectorType::Dameng => "dameng",
            ConnectorType::Kafka => "kafka",
            ConnectorType::Hdfs => "hdfs",
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ConnectorType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MySQL" | "mysql" => Ok(ConnectorType::MySql),
            "PostgreSQL" | "postgresql" => Ok(ConnectorType::PostgreSql),
            "MongoDB" | "mongodb" => Ok(ConnectorType::MongoDb),
            "Dameng" | "dameng" => Ok(ConnectorType::Dameng),
            "Kafka" | "kafka" => Ok(ConnectorType::Kafka),
            "HDFS" | "hdfs" => Ok(ConnectorType::Hdfs),
            other => Err(ValidationError::UnknownConnectorType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Full,
    Incremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Enabled,
    Disabled,
}

/// Value type of the incremental column. Determines both the watermark
/// default and the shape of the generated read predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncrementalColumnType {
    Int,
    Datetime,
    Date,
}

impl IncrementalColumnType {
    /// Initial watermark for a freshly created (or re-typed) incremental task.
    pub fn default_watermark(&self) -> &'static str {
        match self {
            IncrementalColumnType::Int => "0",
            IncrementalColumnType::Datetime => "1970-01-01 00:00:00",
            IncrementalColumnType::Date => "1970-01-01",
        }
    }
}

impl FromStr for IncrementalColumnType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(IncrementalColumnType::Int),
            "datetime" => Ok(IncrementalColumnType::Datetime),
            "date" => Ok(IncrementalColumnType::Date),
            other => Err(ValidationError::UnsupportedIncrementalType(
                other.to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementalSpec {
    pub column: String,
    pub column_type: IncrementalColumnType,
}

/// One side of a sync task. The connector type is resolved from the
/// referenced connection, never supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub connection_id: u64,
    pub connector_type: ConnectorType,
    pub table: String,
}

/// Connector metadata as resolved by a `ConnectionResolver`. Read-only
/// to this subsystem; credentials pass through into generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub id: u64,
    pub name: String,
    pub connector_type: ConnectorType,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub secret: String,
}

/// Persisted sync-task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncTask {
    pub id: u64,
    pub name: String,
    pub mode: SyncMode,
    pub source: Endpoint,
    pub target: Endpoint,
    /// Opaque schedule expression, passed through to the scheduler verbatim.
    pub schedule: String,
    /// Present iff `mode == Incremental`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incremental: Option<IncrementalSpec>,
    /// Textual watermark; representation follows the incremental column type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_watermark: Option<String>,
    /// Column restriction for the extract; empty means all columns.
    #[serde(default)]
    pub columns: Vec<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncTask {
    /// True when a *critical* field differs from `other`: both artifacts
    /// must then be regenerated. Name, status and column restriction are
    /// deliberately not part of this set.
    pub fn critical_fields_differ(&self, other: &SyncTask) -> bool {
        self.source.connection_id != other.source.connection_id
            || self.target.connection_id != other.target.connection_id
            || self.source.table != other.source.table
            || self.target.table != other.target.table
            || self.mode != other.mode
            || self.incremental != other.incremental
            || self.schedule != other.schedule
    }
}

/// Input for `TaskOrchestrator::create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
    pub mode: SyncMode,
    pub source_id: u64,
    pub source_table: String,
    pub target_id: u64,
    pub target_table: String,
    pub schedule: String,
    #[serde(default)]
    pub incremental: Option<IncrementalSpec>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default = "default_draft_status")]
    pub status: TaskStatus,
}

fn default_draft_status() -> TaskStatus {
    TaskStatus::Enabled
}

/// Partial update for `TaskOrchestrator::update`. Absent fields keep the
/// stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mode: Option<SyncMode>,
    #[serde(default)]
    pub source_id: Option<u64>,
    #[serde(default)]
    pub source_table: Option<String>,
    #[serde(default)]
    pub target_id: Option<u64>,
    #[serde(default)]
    pub target_table: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub incremental: Option<IncrementalSpec>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}
