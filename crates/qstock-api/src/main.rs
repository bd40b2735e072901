//! qstock API binary entry point.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use qstock_adapter_ibm::IbmBackend;
use qstock_api::startup::{probe_backends, shutdown_signal};
use qstock_api::{AppState, Config, PredictSettings, create_router, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration errors end the process before anything is bound.
    let config = Config::load().context("invalid configuration")?;

    init_tracing(&config.tracing).context("failed to initialize tracing")?;
    info!(?config, "configuration loaded");

    let backend = IbmBackend::new(config.ibm.clone()).context("failed to create IBM Quantum backend")?;
    info!(backend = backend.target(), endpoint = backend.client().endpoint(), "IBM Quantum backend ready");

    if config.startup_probe {
        probe_backends(backend.client(), backend.target()).await?;
    }

    let state = Arc::new(
        AppState::new(Arc::new(backend)).with_predict_settings(PredictSettings::from(&config)),
    );
    let app = create_router(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!("Quantum Stock Prediction API listening on http://{}", config.bind_address);
    info!("CORS origins: {}", config.cors_origins);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}
