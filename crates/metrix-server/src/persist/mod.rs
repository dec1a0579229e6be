//! Snapshot persistence.
//!
//! A backend stores and loads the whole store as one [`Snapshot`]. The file
//! backend rewrites a JSON document; the PostgreSQL backend upserts rows.

pub mod file;
pub mod postgres;
pub mod saver;

use std::sync::Arc;

use async_trait::async_trait;

use metrix_core::error::Result;
use metrix_core::{MetricStore, Snapshot};

use crate::config::ServerConfig;

pub use file::FileBackend;
pub use postgres::PostgresBackend;
pub use saver::Saver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Database,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::File => "file",
            BackendKind::Database => "database",
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// `None` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<Snapshot>>;

    async fn ping(&self) -> Result<()>;
}

/// Pick the backend for `cfg`: a DSN wins over a file path; neither means
/// the store lives in memory only.
pub async fn connect(cfg: &ServerConfig) -> Result<Option<Arc<dyn Backend>>> {
    if cfg.uses_database() {
        let pg = PostgresBackend::connect(&cfg.database_dsn).await?;
        return Ok(Some(Arc::new(pg)));
    }
    if !cfg.file_storage_path.is_empty() {
        return Ok(Some(Arc::new(FileBackend::new(&cfg.file_storage_path))));
    }
    Ok(None)
}

/// Replace the store contents with the backend's last snapshot, if any.
pub async fn restore(store: &MetricStore, backend: &dyn Backend) -> Result<usize> {
    match backend.load().await? {
        Some(snapshot) => {
            let n = snapshot.len();
            store.replace(snapshot);
            tracing::info!(backend = backend.kind().as_str(), metrics = n, "store restored");
            Ok(n)
        }
        None => {
            tracing::info!(backend = backend.kind().as_str(), "nothing to restore");
            Ok(0)
        }
    }
}
