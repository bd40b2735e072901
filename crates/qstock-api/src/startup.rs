//! Startup checks and shutdown handling for the binary.

use anyhow::{Context, bail};
use tracing::{info, warn};

use qstock_adapter_ibm::IbmClient;

/// List the backends visible to the configured credentials.
///
/// Fails when the request fails or the list is empty, so a bad token or an
/// instance without devices stops the process before it serves traffic.
pub async fn probe_backends(client: &IbmClient, target: &str) -> anyhow::Result<Vec<String>> {
    let names = client
        .list_backend_names()
        .await
        .context("failed to list IBM Quantum backends")?;

    if names.is_empty() {
        bail!("no IBM Quantum backends available; check the API token and instance");
    }

    info!(backends = ?names, "available backends");
    if !names.iter().any(|n| n == target) {
        warn!(backend = target, "configured backend is not in the available list");
    }

    Ok(names)
}

/// Resolve on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT"),
        () = terminate => info!("Received SIGTERM"),
    }
}
