//! Quantum Stock Prediction API.
//!
//! A small axum service with a set of fixed informational endpoints and
//! `/predict`, which runs a Bell circuit on IBM Quantum and returns the
//! measured outcome distribution.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use qstock_adapter_ibm::IbmBackend;
//! use qstock_api::{AppState, Config, PredictSettings, create_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let backend = Arc::new(IbmBackend::new(config.ibm.clone())?);
//!     let state = Arc::new(AppState::new(backend).with_predict_settings(PredictSettings::from(&config)));
//!
//!     let app = create_router(state, &config.cors_origins);
//!     let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dto;
pub mod error;
pub mod server;
pub mod startup;
pub mod state;
pub mod tracing_config;

pub use config::{Config, ConfigError, EnvSource};
pub use dto::PredictResponse;
pub use error::PredictError;
pub use server::create_router;
pub use state::{AppState, PredictSettings};
pub use tracing_config::{LogFormat, TracingConfig, init_tracing};
