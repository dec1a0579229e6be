//! Poll/report loop.
//!
//! Two timers share one store. Poll samples runtime stats into it; report
//! ships a snapshot through the [`Sender`]. Counters are never reset after a
//! report, so every report carries the running totals.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use metrix_core::error::Result;
use metrix_core::MetricStore;

use crate::collector::Collector;
use crate::sender::Sender;

pub struct Agent {
    store: Arc<MetricStore>,
    sender: Arc<dyn Sender>,
    poll_interval: Duration,
    report_interval: Duration,
}

impl Agent {
    pub fn new(
        sender: Arc<dyn Sender>,
        poll_interval: Duration,
        report_interval: Duration,
    ) -> Self {
        Self {
            store: Arc::new(MetricStore::new()),
            sender,
            poll_interval,
            report_interval,
        }
    }

    pub fn store(&self) -> &Arc<MetricStore> {
        &self.store
    }

    /// Send the current snapshot once. An empty store sends nothing.
    pub async fn report(&self) -> Result<()> {
        let metrics = self.store.snapshot().to_metrics();
        if metrics.is_empty() {
            return Ok(());
        }
        self.sender.send(metrics).await
    }

    /// Run until `shutdown` fires. A report already in progress is finished
    /// (including its retries); no new cycle starts afterwards.
    pub async fn run(self, collector: Collector, shutdown: CancellationToken) {
        let poller = tokio::spawn(poll_loop(
            self.store.clone(),
            collector,
            self.poll_interval,
            shutdown.clone(),
        ));

        let mut tick = ticker(self.report_interval).await;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tick.tick() => {
                    if let Err(e) = self.report().await {
                        tracing::error!(
                            code = e.client_code().as_str(),
                            error = %e,
                            "report failed"
                        );
                    }
                }
            }
        }

        if let Err(e) = poller.await {
            tracing::error!(error = %e, "poll task ended abnormally");
        }
        tracing::info!("agent stopped");
    }
}

async fn poll_loop(
    store: Arc<MetricStore>,
    mut collector: Collector,
    every: Duration,
    shutdown: CancellationToken,
) {
    let mut tick = ticker(every).await;
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = tick.tick() => collector.poll(&store),
        }
    }
}

/// Interval whose first tick is one period away.
async fn ticker(every: Duration) -> Interval {
    let mut tick = tokio::time::interval(every);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tick.tick().await;
    tick
}
