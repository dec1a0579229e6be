use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use metrix_agent::collector::CountingAllocator;
use metrix_agent::{config, Agent, Collector, HttpSender};
use metrix_core::error::Result;

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator::new();

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.client_code().as_str(), error = %e, "metrix-agent failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = config::AgentArgs::parse();
    let cfg = config::load(&args)?;

    let sender = Arc::new(HttpSender::new(&cfg)?);
    let agent = Agent::new(sender, cfg.poll_interval(), cfg.report_interval());

    tracing::info!(
        server = %cfg.base_url(),
        poll_interval_secs = cfg.poll_interval_secs,
        report_interval_secs = cfg.report_interval_secs,
        mode = ?cfg.mode,
        compress = cfg.compress,
        signed = !cfg.key.is_empty(),
        "metrix-agent starting"
    );

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
        tracing::info!("signal received, stopping agent");
        on_signal.cancel();
    });

    agent.run(Collector::new(), shutdown).await;
    Ok(())
}
