//! HTTP client for the scheduler control API (basic auth).

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{RunState, SchedulerApi, WorkflowStatus};
use crate::config::SchedulerConfig;
use crate::error::SchedulerError;

const MIN_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct HttpSchedulerClient {
    http: Client,
    base_url: String,
    username: String,
    secret: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    exists: bool,
    #[serde(default)]
    paused: bool,
}

#[derive(Debug, Deserialize)]
struct RunBody {
    #[serde(rename = "runId")]
    run_id: String,
}

#[derive(Debug, Deserialize)]
struct RunsBody {
    runs: Vec<RunBody>,
}

impl HttpSchedulerClient {
    pub fn new(cfg: &SchedulerConfig) -> Result<Self, SchedulerError> {
        let timeout = cfg
            .request_timeout_secs
            .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout))
            .build()
            .map_err(|e| SchedulerError::Unavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            username: cfg.username.clone(),
            secret: cfg.secret.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Response, SchedulerError> {
        req.basic_auth(&self.username, Some(&self.secret))
            .send()
            .await
            .map_err(|e| SchedulerError::Unavailable(e.to_string()))
    }

    async fn rejected(resp: Response) -> SchedulerError {
        let status = resp.status().as_u16();
        let detail = resp.text().await.unwrap_or_default();
        SchedulerError::Rejected { status, detail }
    }
}

#[async_trait]
impl SchedulerApi for HttpSchedulerClient {
    async fn get_status(
        &self,
        workflow_id: &str,
    ) -> Result<Option<WorkflowStatus>, SchedulerError> {
        let url = self.url(&format!("/workflows/{workflow_id}"));
        tracing::debug!(target: "syncflow.scheduler", %workflow_id, "GET {}", url);

        let resp = self.send(self.http.get(&url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }
        let body: StatusBody = resp
            .json()
            .await
            .map_err(|e| SchedulerError::BadResponse(e.to_string()))?;
        if !body.exists {
            return Ok(None);
        }
        Ok(Some(WorkflowStatus {
            paused: body.paused,
        }))
    }

    async fn set_paused(&self, workflow_id: &str, paused: bool) -> Result<(), SchedulerError> {
        let url = self.url(&format!("/workflows/{workflow_id}"));
        tracing::debug!(target: "syncflow.scheduler", %workflow_id, paused, "PATCH {}", url);

        let resp = self
            .send(self.http.patch(&url).json(&json!({ "paused": paused })))
            .await?;
        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }
        Ok(())
    }

    async fn trigger_run(&self, workflow_id: &str) -> Result<String, SchedulerError> {
        let url = self.url(&format!("/workflows/{workflow_id}/runs"));
        tracing::debug!(target: "syncflow.scheduler", %workflow_id, "POST {}", url);

        let resp = self.send(self.http.post(&url)).await?;
        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }
        let body: RunBody = resp
            .json()
            .await
            .map_err(|e| SchedulerError::BadResponse(e.to_string()))?;
        Ok(body.run_id)
    }

    async fn list_runs(
        &self,
        workflow_id: &str,
        state: RunState,
    ) -> Result<Vec<String>, SchedulerError> {
        let url = self.url(&format!("/workflows/{workflow_id}/runs"));
        let resp = self
            .send(self.http.get(&url).query(&[("state", state.as_str())]))
            .await?;
        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }
        let body: RunsBody = resp
            .json()
            .await
            .map_err(|e| SchedulerError::BadResponse(e.to_string()))?;
        Ok(body.runs.into_iter().map(|r| r.run_id).collect())
    }

    async fn cancel_run(&self, workflow_id: &str, run_id: &str) -> Result<(), SchedulerError> {
        let url = self.url(&format!("/workflows/{workflow_id}/runs/{run_id}/cancel"));
        tracing::debug!(target: "syncflow.scheduler", %workflow_id, %run_id, "POST {}", url);

        let resp = self.send(self.http.post(&url)).await?;
        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }
        Ok(())
    }
}
