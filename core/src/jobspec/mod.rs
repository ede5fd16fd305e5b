//! Job specification generation.
//!
//! Pure mapping from (task definition, resolved connections) to the JSON
//! job spec the ETL runner consumes. Connector dispatch is an exhaustive
//! match over the closed `ConnectorType` set; Kafka and HDFS are sinks
//! only, so using them as a source is a validation error, not a runtime
//! surprise.

pub mod types;

pub use types::{JobEndpoint, JobLimits, JobParameters, JobSpec};

use crate::error::ValidationError;
use crate::task::{
    ConnectionInfo, ConnectorType, IncrementalColumnType, IncrementalSpec, SyncMode, SyncTask,
};

/// Reader kind for a source connector.
pub fn reader_kind(connector: ConnectorType) -> Result<&'static str, ValidationError> {
    match connector {
        ConnectorType::MySql => Ok("mysqlreader"),
        ConnectorType::PostgreSql => Ok("postgresqlreader"),
        ConnectorType::MongoDb => Ok("mongodbreader"),
        ConnectorType::Dameng => Ok("rdbmsreader"),
        ConnectorType::Kafka | ConnectorType::Hdfs => {
            Err(ValidationError::UnsupportedConnectorType {
                connector,
                role: "source",
            })
        }
    }
}

/// Writer kind for a target connector. Every supported connector can act
/// as a sink.
pub fn writer_kind(connector: ConnectorType) -> &'static str {
    match connector {
        ConnectorType::MySql => "mysqlwriter",
        ConnectorType::PostgreSql => "postgresqlwriter",
        ConnectorType::MongoDb => "mongodbwriter",
        ConnectorType::Dameng => "rdbmswriter",
        ConnectorType::Kafka => "kafkawriter",
        ConnectorType::Hdfs => "hdfswriter",
    }
}

/// Connection URL shared by the reader and writer parameter blocks.
pub fn connection_url(conn: &ConnectionInfo) -> String {
    let scheme = match conn.connector_type {
        ConnectorType::MySql => "jdbc:mysql",
        ConnectorType::PostgreSql => "jdbc:postgresql",
        ConnectorType::Dameng => "jdbc:dm",
        ConnectorType::MongoDb => "mongodb",
        ConnectorType::Kafka => "kafka",
        ConnectorType::Hdfs => "hdfs",
    };
    format!(
        "{scheme}://{}:{}/{}",
        conn.host, conn.port, conn.database
    )
}

/// Incremental read predicate. The `${lastWatermark}` and
/// `${currentProcessingTime}` tokens are left for the runner to resolve
/// against the watermark store at execution time.
pub fn incremental_predicate(spec: &IncrementalSpec) -> String {
    let col = &spec.column;
    match spec.column_type {
        IncrementalColumnType::Int => format!("{col} > '${{lastWatermark}}'"),
        IncrementalColumnType::Datetime | IncrementalColumnType::Date => format!(
            "{col} > '${{lastWatermark}}' AND {col} <= '${{currentProcessingTime}}'"
        ),
    }
}

/// Builds the job spec for `task` against the resolved connections.
pub fn generate(
    task: &SyncTask,
    source: &ConnectionInfo,
    target: &ConnectionInfo,
    limits: JobLimits,
) -> Result<JobSpec, ValidationError> {
    let predicate = match task.mode {
        SyncMode::Incremental => {
            let spec = task
                .incremental
                .as_ref()
                .ok_or(ValidationError::MissingIncrementalSpec)?;
            Some(incremental_predicate(spec))
        }
        SyncMode::Full => None,
    };

    let columns = if task.columns.is_empty() {
        vec!["*".to_string()]
    } else {
        task.columns.clone()
    };

    Ok(JobSpec {
        reader: JobEndpoint {
            kind: reader_kind(source.connector_type)?.to_string(),
            parameters: JobParameters {
                user: source.user.clone(),
                secret: source.secret.clone(),
                connection_url: connection_url(source),
                database: source.database.clone(),
                table: task.source.table.clone(),
                columns: columns.clone(),
                predicate,
            },
        },
        writer: JobEndpoint {
            kind: writer_kind(target.connector_type).to_string(),
            parameters: JobParameters {
                user: target.user.clone(),
                secret: target.secret.clone(),
                connection_url: connection_url(target),
                database: target.database.clone(),
                table: task.target.table.clone(),
                columns,
                predicate: None,
            },
        },
        limits,
    })
}
