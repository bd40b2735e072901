//! Prediction endpoint.
//!
//! ```text
//!   Circuit::bell() ──→ availability() ──→ submit() ──→ wait() ──→ probabilities
//! ```
//!
//! The pipeline runs in its own task so a panic inside a backend becomes an
//! error body instead of a dropped connection. If the request goes away
//! first, the task is aborted and a job already submitted is cancelled.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Json, extract::State};
use tokio::task::{JoinError, JoinHandle};

use qstock_hal::{Backend, JobId};
use qstock_ir::Circuit;

use crate::dto::PredictResponse;
use crate::error::PredictError;
use crate::state::{AppState, PredictSettings};

/// GET /predict - Run the Bell circuit and return the outcome distribution.
///
/// Always answers 200; failures come back as `{"error": "<message>"}`.
pub async fn predict(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PredictResponse>, PredictError> {
    let backend = Arc::clone(&state.backend);
    let settings = state.predict.clone();

    let mut task = AbortOnDrop(tokio::spawn(run_prediction(backend, settings)));
    let outcome = (&mut task.0)
        .await
        .map_err(task_error)
        .and_then(|result| result);

    match outcome {
        Ok(distribution) => Ok(Json(PredictResponse::Distribution(distribution))),
        Err(e) => {
            tracing::error!(error = %e, "prediction failed");
            Err(e)
        }
    }
}

/// Build, submit and wait for the prediction circuit.
///
/// Dropping the future after submission cancels the remote job.
pub async fn run_prediction(
    backend: Arc<dyn Backend>,
    settings: PredictSettings,
) -> Result<BTreeMap<String, f64>, PredictError> {
    let circuit = Circuit::bell()?;
    tracing::info!(
        circuit = circuit.name(),
        qubits = circuit.num_qubits(),
        depth = circuit.depth(),
        "circuit created"
    );

    let availability = backend.availability().await?;
    if !availability.is_available {
        return Err(PredictError::Unavailable {
            backend: backend.name().to_string(),
            reason: availability
                .status_message
                .unwrap_or_else(|| "no status reported".to_string()),
        });
    }

    let job_id = backend.submit(&circuit, settings.shots).await?;
    tracing::info!(%job_id, backend = backend.name(), shots = settings.shots, "job submitted");

    let pending = PendingJob::new(Arc::clone(&backend), job_id.clone());
    let result = backend.wait(&job_id, settings.poll_interval).await;
    pending.settle();
    let result = result?;
    tracing::info!(%job_id, shots = result.shots, outcomes = result.counts.len(), "job finished");

    if result.counts.is_empty() {
        return Err(PredictError::EmptyResult(job_id));
    }

    Ok(result.probabilities().into_iter().collect())
}

/// Aborts the prediction task when the request future is dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A submitted job that is cancelled unless it is settled first.
struct PendingJob {
    backend: Arc<dyn Backend>,
    job_id: Option<JobId>,
}

impl PendingJob {
    fn new(backend: Arc<dyn Backend>, job_id: JobId) -> Self {
        Self {
            backend,
            job_id: Some(job_id),
        }
    }

    /// The job reached an outcome; nothing to cancel.
    fn settle(mut self) {
        self.job_id = None;
    }
}

impl Drop for PendingJob {
    fn drop(&mut self) {
        let Some(job_id) = self.job_id.take() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(%job_id, "prediction abandoned outside a runtime, job left running");
            return;
        };

        tracing::warn!(%job_id, "prediction abandoned, cancelling job");
        let backend = Arc::clone(&self.backend);
        runtime.spawn(async move {
            if let Err(e) = backend.cancel(&job_id).await {
                tracing::warn!(%job_id, error = %e, "failed to cancel abandoned job");
            }
        });
    }
}

fn task_error(e: JoinError) -> PredictError {
    if e.is_panic() {
        PredictError::Panicked(panic_message(e.into_panic().as_ref()))
    } else {
        PredictError::Cancelled
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
