use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use metrix_core::error::{MetrixError, Result};
use metrix_core::Snapshot;

use super::{Backend, BackendKind};

/// Whole-snapshot JSON file. Writes land in a sibling temp file that is
/// renamed over the target, so readers never see a partial document.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Backend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let body = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| MetrixError::PersistenceWriteFailed(format!("encode snapshot: {e}")))?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &body).await.map_err(|e| {
            MetrixError::PersistenceWriteFailed(format!("write {}: {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            MetrixError::PersistenceWriteFailed(format!("rename to {}: {e}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), metrics = snapshot.len(), "snapshot saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MetrixError::PersistenceReadFailed(format!(
                    "read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            MetrixError::PersistenceReadFailed(format!("parse {}: {e}", self.path.display()))
        })
    }

    async fn ping(&self) -> Result<()> {
        Err(MetrixError::BackendUnreachable("file storage has no database to ping".into()))
    }
}
