//! HTTP client for the VibeCheck API and the run lifecycle built on it.
//!
//! [`ApiClient`] is a thin async wrapper over the REST surface. Remote
//! failures are mapped onto [`VibeError`] kinds:
//! - 401/403 become [`VibeError::Authentication`]
//! - connect failures and timeouts become [`VibeError::Network`]
//! - 404 becomes [`VibeError::NotFound`]
//! - anything else carries the server's `error` message in [`VibeError::Api`]

pub mod lifecycle;
pub mod types;

pub use lifecycle::{
    CancelToken, ManualScheduler, PollOptions, RunLifecycle, RunOutcome, Scheduler,
    TokioScheduler,
};
pub use types::*;

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::future::Future;
use tracing::debug;

use crate::config::ClientSettings;
use crate::error::{Result, VibeError};
use crate::suite::EvalSuite;

/// Operations the run lifecycle needs from the remote service.
pub trait RunBackend {
    /// Submit a suite and return the new run's identifier.
    fn submit(
        &self,
        suite: &EvalSuite,
        yaml: Option<&str>,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Fetch the current status of a run. Never loops.
    fn poll(&self, run_id: &str) -> impl Future<Output = Result<RunStatus>> + Send;

    /// Ask the server to cancel a queued run.
    fn cancel(&self, run_id: &str) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    settings: ClientSettings,
}

impl ApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let user_agent = format!(
            "vibecheck/{} ({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| VibeError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Build an endpoint URL from path segments, encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let base = self.settings.api_url();
        let mut url = Url::parse(base).map_err(|e| VibeError::invalid_value("API URL", e))?;
        url.path_segments_mut()
            .map_err(|_| VibeError::invalid_value("API URL", base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the decoded JSON body of a successful response.
    async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<Value> {
        let api_key = self.settings.api_key().ok_or(VibeError::MissingApiKey)?;
        let url = self.endpoint(segments)?;
        let path = format!("/{}", segments.join("/"));

        debug!(method = %method, url = %url, "api_request");

        let mut request = self.http.request(method, url.clone()).bearer_auth(api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| network_error(url.as_str(), e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| network_error(url.as_str(), e))?;

        debug!(status = status.as_u16(), url = %url, "api_response");

        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()))
        };

        if !status.is_success() {
            return Err(status_error(status, &path, &body));
        }

        if let Some(message) = body.get("error").and_then(Value::as_str) {
            return Err(VibeError::Api {
                status: status.as_u16(),
                message: message.to_string(),
            });
        }

        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let body = self.request(Method::GET, segments, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn save_suite(&self, suite: &EvalSuite, yaml: Option<&str>) -> Result<()> {
        let body = json!({ "evalSuite": suite, "yamlContent": yaml });
        self.request(Method::POST, &["suite", "save"], Some(&body))
            .await
            .map(|_| ())
    }

    pub async fn list_suites(&self) -> Result<Vec<SuiteInfo>> {
        Ok(self.get::<SuiteList>(&["suite", "list"]).await?.suites)
    }

    pub async fn get_suite(&self, name: &str) -> Result<SavedSuite> {
        self.get(&["suite", name])
            .await
            .map_err(|e| rename_not_found(e, "suite", name))
    }

    pub async fn list_runs(&self) -> Result<Vec<RunInfo>> {
        Ok(self.get::<RunList>(&["runs"]).await?.runs)
    }

    pub async fn get_run(&self, run_id: &str) -> Result<RunInfo> {
        self.get(&["runs", run_id])
            .await
            .map_err(|e| rename_not_found(e, "run", run_id))
    }

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(self.get::<ModelList>(&["models"]).await?.models)
    }

    pub async fn org_info(&self) -> Result<OrgInfo> {
        self.get(&["orginfo"]).await
    }

    pub async fn list_vars(&self) -> Result<Vec<Var>> {
        Ok(self.get::<VarList>(&["vars"]).await?.vars)
    }

    pub async fn get_var(&self, name: &str) -> Result<Var> {
        self.get(&["vars", name])
            .await
            .map_err(|e| rename_not_found(e, "var", name))
    }

    pub async fn set_var(&self, name: &str, value: &str) -> Result<()> {
        let body = json!({ "value": value });
        self.request(Method::PUT, &["vars", name], Some(&body))
            .await
            .map(|_| ())
    }

    pub async fn delete_var(&self, name: &str) -> Result<()> {
        self.request(Method::DELETE, &["vars", name], None)
            .await
            .map(|_| ())
            .map_err(|e| rename_not_found(e, "var", name))
    }

    pub async fn list_secrets(&self) -> Result<Vec<SecretInfo>> {
        Ok(self.get::<SecretList>(&["secrets"]).await?.secrets)
    }

    pub async fn set_secret(&self, name: &str, value: &str) -> Result<()> {
        let body = json!({ "value": value });
        self.request(Method::PUT, &["secrets", name], Some(&body))
            .await
            .map(|_| ())
    }

    pub async fn delete_secret(&self, name: &str) -> Result<()> {
        self.request(Method::DELETE, &["secrets", name], None)
            .await
            .map(|_| ())
            .map_err(|e| rename_not_found(e, "secret", name))
    }
}

impl RunBackend for ApiClient {
    async fn submit(&self, suite: &EvalSuite, yaml: Option<&str>) -> Result<String> {
        let body = json!({ "evalSuite": suite, "yamlContent": yaml });
        let response = self.request(Method::POST, &["eval", "run"], Some(&body)).await?;
        let submitted: SubmitResponse = serde_json::from_value(response)?;

        submitted.run_id.ok_or_else(|| VibeError::Api {
            status: StatusCode::OK.as_u16(),
            message: "response did not include a run id".to_string(),
        })
    }

    async fn poll(&self, run_id: &str) -> Result<RunStatus> {
        let body = self
            .request(Method::GET, &["status", run_id], None)
            .await
            .map_err(|e| rename_not_found(e, "run", run_id))?;
        Ok(serde_json::from_value(body)?)
    }

    async fn cancel(&self, run_id: &str) -> Result<()> {
        match self
            .request(Method::POST, &["runs", run_id, "cancel"], None)
            .await
        {
            Ok(_) => Ok(()),
            Err(VibeError::Api {
                status: 409,
                message,
            }) => Err(VibeError::CancellationRejected {
                run_id: run_id.to_string(),
                message,
            }),
            Err(e) => Err(rename_not_found(e, "run", run_id)),
        }
    }
}

fn network_error(url: &str, err: reqwest::Error) -> VibeError {
    if err.is_builder() {
        return VibeError::Other(format!("invalid request to {}: {}", url, err));
    }

    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        err.to_string()
    };

    VibeError::Network {
        url: url.to_string(),
        reason,
    }
}

fn status_error(status: StatusCode, path: &str, body: &Value) -> VibeError {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| body.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VibeError::Authentication {
            status: status.as_u16(),
            message,
        },
        StatusCode::NOT_FOUND => VibeError::not_found("resource", path),
        _ => VibeError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Replace the generic 404 mapping with the entity the caller asked for.
fn rename_not_found(err: VibeError, context: &str, value: &str) -> VibeError {
    match err {
        VibeError::NotFound { .. } => VibeError::not_found(context, value),
        other => other,
    }
}
