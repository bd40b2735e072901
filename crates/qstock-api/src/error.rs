//! Error type for the prediction endpoint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use qstock_hal::{HalError, JobId};
use qstock_ir::IrError;

use crate::dto::PredictResponse;

/// Everything that can go wrong while producing a prediction.
///
/// Converts to a 200 response carrying `{"error": "<message>"}`; callers
/// tell success from failure by the body, not the status code.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Circuit construction failed: {0}")]
    Circuit(#[from] IrError),

    #[error("Backend {backend} is not available: {reason}")]
    Unavailable { backend: String, reason: String },

    #[error("{0}")]
    Backend(#[from] HalError),

    #[error("Job {0} returned no measurement results")]
    EmptyResult(JobId),

    #[error("Prediction task panicked: {0}")]
    Panicked(String),

    #[error("Prediction task was cancelled")]
    Cancelled,
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(PredictResponse::error(self.to_string()))).into_response()
    }
}
