//! In-memory metric table.
//!
//! Counters accumulate (merge = wrapping sum), gauges are replaced (merge =
//! last write wins). Both maps live behind one mutex so no reader ever sees
//! a half-applied batch; the lock is never held across I/O. Serialization
//! only ever happens on a [`Snapshot`], a lock-free copy.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Point-in-time copy of the whole store.
///
/// JSON shape: `{"counter": {name: u64}, "gauge": {name: f64}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    #[serde(default)]
    pub counter: BTreeMap<String, u64>,
    #[serde(default)]
    pub gauge: BTreeMap<String, f64>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.counter.is_empty() && self.gauge.is_empty()
    }

    /// Number of entries across both kinds.
    pub fn len(&self) -> usize {
        self.counter.len() + self.gauge.len()
    }
}

#[derive(Debug, Default)]
struct Tables {
    counters: HashMap<String, u64>,
    gauges: HashMap<String, f64>,
}

/// Concurrency-safe metric table.
///
/// Constructed explicitly and shared by `Arc`; there is no global instance.
#[derive(Debug, Default)]
pub struct MetricStore {
    inner: Mutex<Tables>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning leaves the maps structurally valid.
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add `delta` to the named counter (absent = 0). Wraps at 2^64.
    pub fn increment_counter(&self, name: &str, delta: u64) -> u64 {
        let mut t = self.lock();
        let slot = t.counters.entry(name.to_string()).or_insert(0);
        *slot = slot.wrapping_add(delta);
        *slot
    }

    /// Replace the named gauge.
    pub fn update_gauge(&self, name: &str, value: f64) {
        self.lock().gauges.insert(name.to_string(), value);
    }

    pub fn counter(&self, name: &str) -> Option<u64> {
        self.lock().counters.get(name).copied()
    }

    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.lock().gauges.get(name).copied()
    }

    /// Consistent copy of both maps, taken under the lock.
    pub fn snapshot(&self) -> Snapshot {
        let t = self.lock();
        Snapshot {
            counter: t.counters.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            gauge: t.gauges.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }

    /// Apply a snapshot as a bulk update: counters increment, gauges replace.
    ///
    /// The whole snapshot is applied under a single lock acquisition.
    pub fn merge(&self, incoming: &Snapshot) {
        let mut t = self.lock();
        for (name, delta) in &incoming.counter {
            let slot = t.counters.entry(name.clone()).or_insert(0);
            *slot = slot.wrapping_add(*delta);
        }
        for (name, value) in &incoming.gauge {
            t.gauges.insert(name.clone(), *value);
        }
    }

    /// Discard current contents and install `snapshot` (startup restore).
    pub fn replace(&self, snapshot: Snapshot) {
        let mut t = self.lock();
        t.counters = snapshot.counter.into_iter().collect();
        t.gauges = snapshot.gauge.into_iter().collect();
    }

    pub fn len(&self) -> usize {
        let t = self.lock();
        t.counters.len() + t.gauges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
