//! qstock Hardware Abstraction Layer
//!
//! A small, async interface over remote quantum execution services. The
//! prediction service talks to IBM Quantum through it, and tests plug in
//! in-process fakes.
//!
//! # Overview
//!
//! - A common [`Backend`] trait for job submission and management
//! - [`JobId`] / [`JobStatus`] for the job lifecycle
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use std::time::Duration;
//! use qstock_hal::Backend;
//! use qstock_ir::Circuit;
//!
//! async fn run(backend: &dyn Backend) -> qstock_hal::HalResult<()> {
//!     let circuit = Circuit::bell()?;
//!     let job_id = backend.submit(&circuit, 1024).await?;
//!     let result = backend.wait(&job_id, Duration::from_secs(2)).await?;
//!
//!     for (bitstring, p) in result.probabilities() {
//!         println!("{bitstring}: {p:.3}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendAvailability};
pub use error::{HalError, HalResult};
pub use job::{JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
