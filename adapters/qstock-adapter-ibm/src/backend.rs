//! IBM Quantum backend implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use qstock_hal::{
    Backend, BackendAvailability, Counts, ExecutionResult, HalError, HalResult, JobId, JobStatus,
};
use qstock_ir::Circuit;
use qstock_qasm3::emit;

use crate::api::{BackendInfo, IbmClient, JobResultResponse};
use crate::config::IbmConfig;
use crate::error::{IbmError, IbmResult};

/// How long to cache backend info before refreshing from the API.
const BACKEND_INFO_TTL: Duration = Duration::from_secs(5 * 60);

/// Shots assumed for quasi-distributions when the metadata omits them.
const DEFAULT_QUASI_SHOTS: f64 = 1024.0;

/// Register name the emitter declares for measurement results.
const CLASSICAL_REGISTER: &str = "c";

/// IBM Quantum backend adapter.
pub struct IbmBackend {
    /// API client.
    client: Arc<IbmClient>,
    /// Target backend name.
    target: String,
    /// Cached backend info with fetch timestamp for TTL-based refresh.
    backend_info: Arc<RwLock<Option<(BackendInfo, Instant)>>>,
    /// Classical register width of each submitted job, until its result is read.
    job_widths: RwLock<HashMap<JobId, usize>>,
}

impl IbmBackend {
    /// Create a backend from connection settings.
    ///
    /// No request is made here; the IAM exchange happens on first use.
    pub fn new(config: IbmConfig) -> IbmResult<Self> {
        let client = IbmClient::new(&config)?;

        Ok(Self {
            client: Arc::new(client),
            target: config.target,
            backend_info: Arc::new(RwLock::new(None)),
            job_widths: RwLock::new(HashMap::new()),
        })
    }

    /// Get the target backend name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get the underlying API client.
    pub fn client(&self) -> &IbmClient {
        &self.client
    }

    /// Get backend information, fetching from API if not cached or stale.
    async fn get_backend_info(&self) -> IbmResult<BackendInfo> {
        {
            let cached = self.backend_info.read().await;
            if let Some((ref info, fetched_at)) = *cached {
                if fetched_at.elapsed() < BACKEND_INFO_TTL {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.client.get_backend(&self.target).await?;

        {
            let mut cached = self.backend_info.write().await;
            *cached = Some((info.clone(), Instant::now()));
        }

        Ok(info)
    }

    /// Convert sampler results to counts.
    ///
    /// Reads V2 per-shot samples when present, otherwise V1 counts, otherwise
    /// V1 quasi-distributions scaled by the shot count in the metadata.
    ///
    /// Bitstrings are `width` bits wide: the register size the service
    /// reports, else `clbits` (the width the circuit was submitted with),
    /// else the bit length of the largest outcome.
    fn results_to_counts(results: &JobResultResponse, clbits: Option<usize>) -> Counts {
        let mut counts = Counts::new();

        let Some(result) = results.results.first() else {
            return counts;
        };

        if let Some(data) = &result.data {
            let register = data
                .get(CLASSICAL_REGISTER)
                .or_else(|| data.values().next());

            if let Some(register) = register {
                let width = register
                    .num_bits
                    .or(clbits)
                    .unwrap_or_else(|| infer_bit_width(&register.samples));
                for sample in &register.samples {
                    counts.insert(hex_to_binary(sample, width), 1);
                }
            }
            return counts;
        }

        if let Some(raw_counts) = &result.counts {
            let width = clbits.unwrap_or_else(|| infer_bit_width(raw_counts.keys()));
            for (bitstring, &count) in raw_counts {
                counts.insert(hex_to_binary(bitstring, width), count);
            }
        } else if let Some(dist) = result.quasi_dists.as_ref().and_then(|d| d.first()) {
            #[allow(clippy::cast_precision_loss)]
            let shots = result
                .metadata
                .as_ref()
                .and_then(|m| m.get("shots"))
                .and_then(serde_json::Value::as_u64)
                .map_or(DEFAULT_QUASI_SHOTS, |s| s as f64);

            let width = clbits.unwrap_or_else(|| infer_bit_width(dist.keys()));
            for (bitstring, &prob) in dist {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let count = (prob * shots).max(0.0).round() as u64;
                if count > 0 {
                    counts.insert(hex_to_binary(bitstring, width), count);
                }
            }
        }

        counts
    }
}

/// Infer the register width from `0x`-prefixed hex outcomes.
///
/// Uses the bit length of the largest value, and at least 1.
/// For example, if samples contain "0x3" the max is 3, which needs 2 bits.
fn infer_bit_width<'a>(outcomes: impl IntoIterator<Item = &'a String>) -> usize {
    let max_val = outcomes
        .into_iter()
        .filter_map(|s| s.strip_prefix("0x"))
        .filter_map(|hex| u64::from_str_radix(hex, 16).ok())
        .max()
        .unwrap_or(0);

    if max_val == 0 {
        1
    } else {
        64 - max_val.leading_zeros() as usize
    }
}

/// Convert a `0x`-prefixed hex outcome to a binary string of `width` bits.
///
/// Anything without the prefix is already a bitstring and passes through.
fn hex_to_binary(outcome: &str, width: usize) -> String {
    match outcome
        .strip_prefix("0x")
        .and_then(|hex| u64::from_str_radix(hex, 16).ok())
    {
        Some(value) => format!("{value:0>width$b}"),
        None => outcome.to_string(),
    }
}

/// Map an IBM job status string onto the HAL lifecycle.
fn map_job_status(status: &str, reason: Option<String>) -> JobStatus {
    match status.to_uppercase().as_str() {
        "QUEUED" => JobStatus::Queued,
        "VALIDATING" | "RUNNING" => JobStatus::Running,
        "COMPLETED" => JobStatus::Completed,
        "FAILED" | "ERROR" => JobStatus::Failed(reason.unwrap_or_else(|| "Unknown error".into())),
        "CANCELLED" => JobStatus::Cancelled,
        // Treat unknown as running
        _ => JobStatus::Running,
    }
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        &self.target
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.get_backend_info().await {
            Ok(info) if info.status.operational => Ok(BackendAvailability {
                is_available: true,
                queue_depth: info.status.pending_jobs,
                status_message: info.status.status_msg,
            }),
            Ok(info) => Ok(BackendAvailability::unavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| "backend offline".to_string()),
            )),
            Err(e) => {
                tracing::warn!(backend = %self.target, error = %e, "IBM backend availability check failed");
                Ok(BackendAvailability::unavailable(format!(
                    "failed to query backend {}: {e}",
                    self.target
                )))
            }
        }
    }

    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        let info = self.get_backend_info().await?;

        if circuit.num_qubits() > info.num_qubits {
            return Err(IbmError::TooManyQubits {
                required: circuit.num_qubits(),
                available: info.num_qubits,
            }
            .into());
        }

        if !info.status.operational {
            return Err(HalError::BackendUnavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| format!("{} is offline", self.target)),
            ));
        }

        if !circuit
            .instructions()
            .iter()
            .any(|i| i.is_measure() && !i.qubits.is_empty())
        {
            return Err(IbmError::CircuitError(
                "the Sampler needs at least one measurement".into(),
            )
            .into());
        }

        let qasm = emit(circuit);
        tracing::debug!(backend = %self.target, shots, %qasm, "submitting sampler job");

        let response = self
            .client
            .submit_sampler_job(&self.target, vec![qasm], shots)
            .await
            .map_err(|e| match e {
                IbmError::ApiError { .. } => HalError::SubmissionFailed(e.to_string()),
                other => other.into(),
            })?;

        tracing::info!(backend = %self.target, job_id = %response.id, "sampler job submitted");
        let job_id = JobId(response.id);
        self.job_widths
            .write()
            .await
            .insert(job_id.clone(), circuit.num_clbits());
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self.client.get_job_status(&job_id.0).await?;
        let reason = status.error_message();
        Ok(map_job_status(&status.status, reason))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let status = self.client.get_job_status(&job_id.0).await?;

        if !status.is_completed() {
            if status.is_failed() || status.is_cancelled() {
                self.job_widths.write().await.remove(job_id);
            }
            if status.is_failed() {
                let msg = status
                    .error_message()
                    .unwrap_or_else(|| "Job failed".to_string());
                return Err(HalError::JobFailed(msg));
            }
            if status.is_cancelled() {
                return Err(HalError::JobCancelled);
            }
            return Err(HalError::Backend(format!(
                "Job {} not yet completed",
                job_id.0
            )));
        }

        let clbits = self.job_widths.read().await.get(job_id).copied();
        let results = self.client.get_job_results(&job_id.0).await?;
        let counts = Self::results_to_counts(&results, clbits);
        self.job_widths.write().await.remove(job_id);
        let shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);

        let mut result = ExecutionResult::new(counts, shots);
        if let Some(metadata) = results.results.into_iter().next().and_then(|r| r.metadata) {
            result = result.with_metadata(metadata);
        }
        Ok(result)
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_job(&job_id.0).await?;
        Ok(())
    }
}
