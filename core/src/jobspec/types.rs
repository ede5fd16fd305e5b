use serde::{Deserialize, Serialize};

/// Extract/load job specification consumed by the ETL runner. Serialized
/// as the JSON artifact next to the workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub reader: JobEndpoint,
    pub writer: JobEndpoint,
    pub limits: JobLimits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEndpoint {
    pub kind: String,
    pub parameters: JobParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobParameters {
    pub user: String,
    pub secret: String,
    #[serde(rename = "connectionURL")]
    pub connection_url: String,
    pub database: String,
    pub table: String,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLimits {
    pub concurrency: u32,
    pub error_record_limit: u64,
    pub error_percent_limit: f64,
}

impl Default for JobLimits {
    fn default() -> Self {
        Self {
            concurrency: 3,
            error_record_limit: 0,
            error_percent_limit: 0.02,
        }
    }
}
