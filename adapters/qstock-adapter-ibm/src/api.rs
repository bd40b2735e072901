//! IBM Quantum Platform API client.
//!
//! This module implements the parts of the IBM Quantum Cloud REST API the
//! prediction service needs:
//! - Authentication via IAM token exchange (API key flow), cached until
//!   shortly before expiry
//! - Listing backends and reading one backend's configuration and status
//! - Submitting Sampler V2 jobs
//! - Polling job status and retrieving results

// Response fields that are deserialized but not read are part of the
// IBM Quantum API contract and kept for logging and debugging.
#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::IbmConfig;
use crate::error::{IbmError, IbmResult};

/// IBM API version header value.
const IBM_API_VERSION: &str = "2026-02-01";

/// User-Agent sent with requests (Cloudflare blocks the default reqwest UA).
const USER_AGENT: &str = concat!("qstock/", env!("CARGO_PKG_VERSION"));

/// Refresh the bearer token this long before IAM says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when IAM omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// IAM token response from `iam.cloud.ibm.com`.
#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// A bearer token and the instant it stops being valid.
struct BearerToken {
    access_token: String,
    expires_at: Instant,
}

impl BearerToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// IBM Quantum API client.
///
/// Construction performs no I/O; the API key is exchanged for a bearer token
/// on the first request.
pub struct IbmClient {
    /// HTTP client for the runtime API.
    client: Client,
    /// HTTP client for IAM (no runtime headers).
    iam_client: Client,
    /// API endpoint URL.
    endpoint: String,
    /// IAM token URL.
    iam_url: String,
    /// IBM Cloud API key.
    api_key: String,
    /// Cached bearer token.
    token: RwLock<Option<BearerToken>>,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("iam_url", &self.iam_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl IbmClient {
    /// Create a client from connection settings.
    pub fn new(config: &IbmConfig) -> IbmResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(IbmError::MissingToken);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );
        if let Some(crn) = &config.service_crn {
            headers.insert(
                header::HeaderName::from_static("service-crn"),
                header::HeaderValue::from_str(crn)
                    .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
            );
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let iam_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            iam_client,
            endpoint: config.endpoint.clone(),
            iam_url: config.iam_url.clone(),
            api_key: config.api_key.clone(),
            token: RwLock::new(None),
        })
    }

    /// Runtime API base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get a bearer token, exchanging the API key when none is cached or the
    /// cached one is about to expire.
    async fn bearer_token(&self) -> IbmResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
                return Ok(token.access_token.clone());
            }
        }

        let mut cached = self.token.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let token = self.exchange_api_key().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Exchange the API key for an IAM bearer token.
    async fn exchange_api_key(&self) -> IbmResult<BearerToken> {
        tracing::debug!(iam_url = %self.iam_url, "exchanging API key for IAM token");

        let response = self
            .iam_client
            .post(&self.iam_url)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::IamTokenExchange(format!(
                "IAM returned {status}: {body}"
            )));
        }

        let iam_token: IamTokenResponse = response.json().await.map_err(|e| {
            IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}"))
        })?;

        let lifetime = iam_token
            .expires_in
            .map_or(DEFAULT_TOKEN_LIFETIME, Duration::from_secs);

        Ok(BearerToken {
            access_token: iam_token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }

    /// Attach the bearer token and send.
    async fn send(&self, request: RequestBuilder) -> IbmResult<Response> {
        let token = self.bearer_token().await?;
        let response = request.bearer_auth(token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Force a fresh exchange on the next request.
            self.token.write().await.take();
        }

        Ok(response)
    }

    /// List the names of backends visible to this instance.
    pub async fn list_backend_names(&self) -> IbmResult<Vec<String>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let response = self.send(self.client.get(&url)).await?;

        if !response.status().is_success() {
            return Err(api_error(response, "list backends failed").await);
        }

        let devices: DevicesResponse = response.json().await?;
        Ok(devices.devices.into_iter().map(|d| d.name).collect())
    }

    /// Get details for a specific backend.
    ///
    /// Fetches `/configuration` and `/status` separately and merges them into
    /// a single [`BackendInfo`].
    pub async fn get_backend(&self, name: &str) -> IbmResult<BackendInfo> {
        let config_url = format!("{}/v1/backends/{}/configuration", self.endpoint, name);
        let config_response = self.send(self.client.get(&config_url)).await?;

        if !config_response.status().is_success() {
            if config_response.status() == StatusCode::NOT_FOUND {
                return Err(IbmError::BackendUnavailable(name.to_string()));
            }
            return Err(api_error(
                config_response,
                &format!("backend configuration failed for {name}"),
            )
            .await);
        }

        let config: BackendConfigResponse = config_response.json().await?;

        let status_url = format!("{}/v1/backends/{}/status", self.endpoint, name);
        let status_response = self.send(self.client.get(&status_url)).await?;

        let status = if status_response.status().is_success() {
            let s: BackendStatusResponse = status_response.json().await?;
            BackendStatus {
                operational: s.state,
                pending_jobs: Some(u32::try_from(s.length_queue).unwrap_or(u32::MAX)),
                status_msg: s.status_message(),
            }
        } else {
            // Configuration succeeded, so treat the device as up.
            tracing::warn!(backend = name, status = %status_response.status(), "backend status lookup failed");
            BackendStatus {
                operational: true,
                status_msg: None,
                pending_jobs: None,
            }
        };

        Ok(BackendInfo {
            name: config.backend_name,
            num_qubits: config.n_qubits,
            status,
        })
    }

    /// Submit a job using the Sampler V2 primitive.
    ///
    /// Each circuit becomes one PUB `[circuit, {}, shots]`. IBM transpiles
    /// with optimization level 1, so circuits need not be ISA-mapped.
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        circuits: Vec<String>,
        shots: u32,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);
        let body = sampler_job_body(backend, circuits, shots);

        let response = self.send(self.client.post(&url).json(&body)).await?;

        if !response.status().is_success() {
            return Err(api_error(response, "job submission failed").await);
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Get job status.
    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{}", self.endpoint, job_id);
        let response = self.send(self.client.get(&url)).await?;

        if !response.status().is_success() {
            if response.status() == StatusCode::NOT_FOUND {
                return Err(IbmError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response, "job status failed").await);
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Get job results.
    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{}/results", self.endpoint, job_id);
        let response = self.send(self.client.get(&url)).await?;

        if !response.status().is_success() {
            if response.status() == StatusCode::NOT_FOUND {
                return Err(IbmError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response, "job results failed").await);
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Cancel a job.
    pub async fn cancel_job(&self, job_id: &str) -> IbmResult<()> {
        let url = format!("{}/v1/jobs/{}/cancel", self.endpoint, job_id);
        let response = self.send(self.client.post(&url)).await?;

        if !response.status().is_success() {
            if response.status() == StatusCode::NOT_FOUND {
                return Err(IbmError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response, "job cancellation failed").await);
        }

        Ok(())
    }
}

/// Build the Sampler V2 job request body.
fn sampler_job_body(backend: &str, circuits: Vec<String>, shots: u32) -> serde_json::Value {
    let pubs: Vec<serde_json::Value> = circuits
        .into_iter()
        .map(|c| serde_json::json!([c, {}, shots]))
        .collect();

    serde_json::json!({
        "program_id": "sampler",
        "backend": backend,
        "params": {
            "version": 2,
            "pubs": pubs,
            "options": {
                "optimization_level": 1
            }
        }
    })
}

/// Turn a non-success response into an [`IbmError`].
async fn api_error(response: Response, context: &str) -> IbmError {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return IbmError::InvalidToken;
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());

    let (code, message) = match serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(ApiErrorResponse::into_parts)
    {
        Some((code, message)) => (code, message),
        None => (None, body),
    };

    IbmError::ApiError {
        code: code.or_else(|| Some(status.as_u16().to_string())),
        message: format!("{context} ({status}): {message}"),
    }
}

// ============================================================================
// Response types
// ============================================================================

/// API error response.
///
/// The Cloud API reports `{"errors": [{"code": …, "message": …}]}`; some
/// endpoints use a flat `{"code": …, "message": …}`.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: String,
}

impl ApiErrorResponse {
    fn into_parts(self) -> Option<(Option<String>, String)> {
        if let Some(first) = self.errors.into_iter().next() {
            return Some((first.code.map(code_to_string), first.message));
        }
        self.message
            .map(|message| (self.code.map(code_to_string), message))
    }
}

fn code_to_string(code: serde_json::Value) -> String {
    match code {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Device list response (`{"devices": [...]}`).
#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

/// A device entry in the backend listing.
#[derive(Debug, Deserialize)]
struct DeviceEntry {
    /// Device name (e.g. "ibm_torino").
    name: String,
}

/// Backend configuration response from `/backends/{name}/configuration`.
#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    n_qubits: usize,
}

/// Backend status response from `/backends/{name}/status`.
#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    /// Whether the backend is operational.
    state: bool,
    /// Status string (e.g., "active").
    #[serde(default)]
    status: String,
    /// Status message.
    #[serde(default)]
    message: String,
    /// Queue length.
    #[serde(default)]
    length_queue: u64,
}

impl BackendStatusResponse {
    /// The human-readable message, else the terse status string.
    fn status_message(self) -> Option<String> {
        [self.message, self.status]
            .into_iter()
            .find(|m| !m.trim().is_empty())
    }
}

/// Backend information.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: usize,
    /// Backend status.
    pub status: BackendStatus,
}

/// Backend status.
#[derive(Debug, Clone)]
pub struct BackendStatus {
    /// Whether the backend is operational.
    pub operational: bool,
    /// Status message.
    pub status_msg: Option<String>,
    /// Number of pending jobs.
    pub pending_jobs: Option<u32>,
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
    /// Job status.
    #[serde(default)]
    pub status: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Job status (mixed case on the Cloud API).
    pub status: String,
    /// Backend name.
    #[serde(default)]
    pub backend: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created: Option<String>,
    /// Error information if failed (older responses).
    #[serde(default)]
    pub error: Option<JobError>,
    /// State object with reason.
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Job error information.
#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Error message.
    pub message: String,
}

/// Job state with reason.
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Status string.
    #[serde(default)]
    pub status: String,
    /// Reason for failure.
    #[serde(default)]
    pub reason: Option<String>,
    /// Reason code.
    #[serde(default)]
    pub reason_code: Option<u32>,
}

impl JobStatusResponse {
    /// Normalized uppercase status for comparison.
    fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    /// Check if job completed successfully.
    pub fn is_completed(&self) -> bool {
        self.normalized_status() == "COMPLETED"
    }

    /// Check if job failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.normalized_status().as_str(), "FAILED" | "ERROR")
    }

    /// Check if job was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "CANCELLED"
    }

    /// Get the error/failure reason message.
    pub fn error_message(&self) -> Option<String> {
        if let Some(reason) = self.state.as_ref().and_then(|s| s.reason.clone()) {
            return Some(reason);
        }
        self.error.as_ref().map(|e| e.message.clone())
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// Job ID (absent on the V2 results endpoint).
    #[serde(default)]
    pub id: Option<String>,
    /// One entry per submitted PUB.
    pub results: Vec<SamplerResult>,
}

/// Sampler result for one circuit.
#[derive(Debug, Deserialize)]
pub struct SamplerResult {
    /// V2 Sampler data: classical register name to per-shot samples.
    #[serde(default)]
    pub data: Option<HashMap<String, ClassicalRegisterData>>,
    /// Quasi-probability distribution (bitstring -> probability), V1 only.
    #[serde(default)]
    pub quasi_dists: Option<Vec<HashMap<String, f64>>>,
    /// Measurement counts (bitstring -> count), V1 only.
    #[serde(default)]
    pub counts: Option<HashMap<String, u64>>,
    /// Metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Classical register data from V2 Sampler results.
#[derive(Debug, Deserialize)]
pub struct ClassicalRegisterData {
    /// Raw measurement samples as hex strings (e.g., `["0x0", "0x3", ...]`).
    pub samples: Vec<String>,
    /// Register width, when the service reports it.
    #[serde(default)]
    pub num_bits: Option<usize>,
}
