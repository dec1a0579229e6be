//! metrix server binary.
//!
//! Loads config, restores the last snapshot, serves the HTTP API and keeps
//! the snapshot saved until a shutdown signal arrives.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use metrix_core::error::{MetrixError, Result};
use metrix_core::protocol::SigningKey;
use metrix_core::MetricStore;
use metrix_server::{app_state::AppState, config, persist, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.client_code().as_str(), error = %e, "metrix-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = config::ServerArgs::parse();
    let cfg = config::load(&args)?;

    let key = SigningKey::from_config(&cfg.key)?;
    let store = Arc::new(MetricStore::new());
    let backend = persist::connect(&cfg).await?;

    if let Some(b) = &backend {
        if cfg.restore {
            persist::restore(&store, b.as_ref()).await?;
        }
    }

    let shutdown = CancellationToken::new();
    let saver = backend.clone().map(|b| {
        let saver = persist::Saver::new(store.clone(), b, cfg.store_interval());
        tokio::spawn(saver.run(shutdown.clone()))
    });

    let state = AppState::new(store, key, backend);
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.address)
        .await
        .map_err(|e| MetrixError::InvalidConfig(format!("bind {}: {e}", cfg.address)))?;
    tracing::info!(
        address = %cfg.address,
        store_interval_secs = cfg.store_interval_secs,
        database = cfg.uses_database(),
        signed = !cfg.key.is_empty(),
        "metrix-server starting"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MetrixError::Internal(format!("server: {e}")));

    shutdown.cancel();
    if let Some(handle) = saver {
        match handle.await {
            Ok(res) => res?,
            Err(e) => return Err(MetrixError::Internal(format!("saver task: {e}"))),
        }
    }
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
