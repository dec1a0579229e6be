//! Shared application state for the metrix server.
//!
//! The store is constructed once in `main` and handed in here; handlers reach
//! it only through this state.

use std::sync::Arc;

use metrix_core::protocol::SigningKey;
use metrix_core::MetricStore;

use crate::persist::Backend;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<MetricStore>,
    key: Option<SigningKey>,
    backend: Option<Arc<dyn Backend>>,
}

impl AppState {
    pub fn new(
        store: Arc<MetricStore>,
        key: Option<SigningKey>,
        backend: Option<Arc<dyn Backend>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                key,
                backend,
            }),
        }
    }

    pub fn store(&self) -> &MetricStore {
        &self.inner.store
    }

    pub fn key(&self) -> Option<&SigningKey> {
        self.inner.key.as_ref()
    }

    pub fn backend(&self) -> Option<&Arc<dyn Backend>> {
        self.inner.backend.as_ref()
    }
}
