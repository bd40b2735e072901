//! Error types for IBM Quantum adapter.

use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when using IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    /// Missing API token.
    #[error("IBM Quantum API token is missing. Set IBM_QUANTUM_API_TOKEN.")]
    MissingToken,

    /// Invalid API token.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// IAM token exchange failed.
    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Quantum API error: {message}")]
    ApiError {
        /// Error code from API (or the HTTP status when none was given).
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Circuit cannot be run through the Sampler.
    #[error("Circuit conversion error: {0}")]
    CircuitError(String),

    /// Backend not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Circuit too large for backend.
    #[error("Circuit requires {required} qubits but backend only has {available}")]
    TooManyQubits {
        /// Qubits needed.
        required: usize,
        /// Qubits available.
        available: usize,
    },

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<IbmError> for qstock_hal::HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingToken | IbmError::InvalidToken | IbmError::IamTokenExchange(_) => {
                qstock_hal::HalError::AuthenticationFailed(e.to_string())
            }
            IbmError::JobNotFound(id) => qstock_hal::HalError::JobNotFound(id),
            IbmError::HttpError(e) => qstock_hal::HalError::Network(e),
            IbmError::JsonError(e) => qstock_hal::HalError::Serialization(e),
            IbmError::BackendUnavailable(msg) => qstock_hal::HalError::BackendUnavailable(msg),
            IbmError::CircuitError(msg) => qstock_hal::HalError::InvalidCircuit(msg),
            IbmError::TooManyQubits { .. } => {
                qstock_hal::HalError::CircuitTooLarge(e.to_string())
            }
            IbmError::InvalidParameter(msg) => qstock_hal::HalError::Configuration(msg),
            _ => qstock_hal::HalError::Backend(e.to_string()),
        }
    }
}
