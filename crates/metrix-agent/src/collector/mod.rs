//! Runtime statistics sampling.
//!
//! Every poll reads one [`Sample`] and writes it to the store through an
//! explicit table of `(name, accessor)` pairs, then bumps `PollCount` and
//! sets a fresh `RandomValue`.

pub mod alloc;

use metrix_core::MetricStore;
use sysinfo::{Pid, ProcessesToUpdate, System};

pub use alloc::{AllocStats, CountingAllocator};

pub const POLL_COUNT: &str = "PollCount";
pub const RANDOM_VALUE: &str = "RandomValue";

/// Raw figures read during one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub heap: AllocStats,
    /// Process resident set size in bytes.
    pub rss: u64,
    pub virtual_memory: u64,
    /// Process CPU usage in percent of one core.
    pub cpu_percent: f32,
    pub total_memory: u64,
    pub free_memory: u64,
    pub used_memory: u64,
}

type Accessor = fn(&Sample) -> f64;

/// Gauges written on every poll.
pub const GAUGES: &[(&str, Accessor)] = &[
    ("Alloc", heap_alloc),
    ("TotalAlloc", total_alloc),
    ("Mallocs", mallocs),
    ("Frees", frees),
    ("HeapObjects", heap_objects),
    ("Sys", rss),
    ("VirtualMemory", virtual_memory),
    ("CPUutilization", cpu_utilization),
    ("TotalMemory", total_memory),
    ("FreeMemory", free_memory),
    ("UsedMemory", used_memory),
];

fn heap_alloc(s: &Sample) -> f64 {
    s.heap.alloc() as f64
}
fn total_alloc(s: &Sample) -> f64 {
    s.heap.total_alloc as f64
}
fn mallocs(s: &Sample) -> f64 {
    s.heap.mallocs as f64
}
fn frees(s: &Sample) -> f64 {
    s.heap.frees as f64
}
fn heap_objects(s: &Sample) -> f64 {
    s.heap.heap_objects() as f64
}
fn rss(s: &Sample) -> f64 {
    s.rss as f64
}
fn virtual_memory(s: &Sample) -> f64 {
    s.virtual_memory as f64
}
fn cpu_utilization(s: &Sample) -> f64 {
    f64::from(s.cpu_percent)
}
fn total_memory(s: &Sample) -> f64 {
    s.total_memory as f64
}
fn free_memory(s: &Sample) -> f64 {
    s.free_memory as f64
}
fn used_memory(s: &Sample) -> f64 {
    s.used_memory as f64
}

/// Owns the `sysinfo` handle; one instance per agent.
pub struct Collector {
    system: System,
    pid: Option<Pid>,
}

impl Collector {
    pub fn new() -> Self {
        let pid = sysinfo::get_current_pid()
            .inspect_err(|e| {
                tracing::warn!(error = %e, "current pid unavailable, process stats disabled")
            })
            .ok();
        Self {
            system: System::new(),
            pid,
        }
    }

    pub fn sample(&mut self) -> Sample {
        self.system.refresh_memory();
        let mut sample = Sample {
            heap: alloc::stats(),
            total_memory: self.system.total_memory(),
            free_memory: self.system.free_memory(),
            used_memory: self.system.used_memory(),
            ..Sample::default()
        };

        if let Some(pid) = self.pid {
            self.system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            if let Some(process) = self.system.process(pid) {
                sample.rss = process.memory();
                sample.virtual_memory = process.virtual_memory();
                sample.cpu_percent = process.cpu_usage();
            }
        }
        sample
    }

    /// Sample and record one poll.
    pub fn poll(&mut self, store: &MetricStore) {
        let sample = self.sample();
        record(store, &sample, rand::random::<f64>());
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `sample` into `store`; `random` becomes the `RandomValue` gauge.
pub fn record(store: &MetricStore, sample: &Sample, random: f64) {
    for (name, read) in GAUGES {
        let value = read(sample);
        if value.is_finite() {
            store.update_gauge(name, value);
        }
    }
    store.update_gauge(RANDOM_VALUE, random);
    let polls = store.increment_counter(POLL_COUNT, 1);
    tracing::trace!(polls, "runtime stats sampled");
}
