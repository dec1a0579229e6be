use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use metrix_core::error::Result;
use metrix_core::MetricStore;

use super::{Backend, BackendKind};

/// Periodic snapshot writer.
///
/// A file write failure stops the loop (the disk is unlikely to recover on
/// its own); database failures are logged and the next tick tries again.
/// One final save always runs on shutdown.
pub struct Saver {
    store: Arc<MetricStore>,
    backend: Arc<dyn Backend>,
    interval: Option<Duration>,
}

impl Saver {
    /// `interval == None` disables periodic saves; only the shutdown save runs.
    pub fn new(
        store: Arc<MetricStore>,
        backend: Arc<dyn Backend>,
        interval: Option<Duration>,
    ) -> Self {
        Self {
            store,
            backend,
            interval,
        }
    }

    pub async fn save_now(&self) -> Result<()> {
        let snapshot = self.store.snapshot();
        self.backend.save(&snapshot).await
    }

    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        if let Some(every) = self.interval {
            let mut tick = tokio::time::interval(every);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick fires immediately
            tick.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = tick.tick() => {
                        match self.save_now().await {
                            Ok(()) => {}
                            Err(e) if self.backend.kind() == BackendKind::File => {
                                tracing::error!(
                                    error = %e,
                                    "snapshot save failed, periodic saving stopped"
                                );
                                shutdown.cancelled().await;
                                break;
                            }
                            Err(e) => tracing::warn!(error = %e, "snapshot save failed"),
                        }
                    }
                }
            }
        } else {
            shutdown.cancelled().await;
        }

        let res = self.save_now().await;
        match &res {
            Ok(()) => {
                tracing::info!(backend = self.backend.kind().as_str(), "final snapshot saved")
            }
            Err(e) => tracing::error!(error = %e, "final snapshot save failed"),
        }
        res
    }
}
