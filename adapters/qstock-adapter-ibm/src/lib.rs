//! qstock Adapter for IBM Quantum
//!
//! This crate implements [`qstock_hal::Backend`] on top of the IBM Quantum
//! Cloud REST API (`https://quantum.cloud.ibm.com/api/v1`). Circuits are sent
//! as `OpenQASM` 3.0 through the Sampler V2 primitive and the per-shot
//! samples come back as [`Counts`].
//!
//! # Authentication
//!
//! An IBM Cloud API key is exchanged for a bearer token at
//! `iam.cloud.ibm.com`. The exchange happens lazily on the first request and
//! the token is reused until a minute before it expires.
//!
//! ```bash
//! export IBM_QUANTUM_API_TOKEN="your-ibm-cloud-api-key"
//! export IBM_QUANTUM_INSTANCE="crn:v1:bluemix:public:quantum-computing:..."  # optional
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use qstock_adapter_ibm::{IbmBackend, IbmConfig};
//! use qstock_hal::Backend;
//! use qstock_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = IbmBackend::new(IbmConfig::new(std::env::var("IBM_QUANTUM_API_TOKEN")?))?;
//!
//!     let job_id = backend.submit(&Circuit::bell()?, 1024).await?;
//!     let result = backend.wait(&job_id, Duration::from_secs(2)).await?;
//!     println!("{:?}", result.probabilities());
//!     Ok(())
//! }
//! ```
//!
//! [`Counts`]: qstock_hal::Counts

mod api;
mod backend;
mod config;
mod error;

pub use api::{BackendInfo, BackendStatus, IbmClient};
pub use backend::IbmBackend;
pub use config::{DEFAULT_BACKEND, DEFAULT_ENDPOINT, DEFAULT_IAM_URL, IbmConfig};
pub use error::{IbmError, IbmResult};
