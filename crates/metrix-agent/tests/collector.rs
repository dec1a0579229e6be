#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use metrix_agent::collector::{self, alloc::AllocStats, Collector, Sample, GAUGES};
use metrix_core::MetricStore;

fn sample() -> Sample {
    Sample {
        heap: AllocStats {
            total_alloc: 1000,
            total_freed: 400,
            mallocs: 10,
            frees: 4,
        },
        rss: 4096,
        virtual_memory: 8192,
        cpu_percent: 12.5,
        total_memory: 16,
        free_memory: 6,
        used_memory: 10,
    }
}

#[test]
fn record_writes_every_gauge_and_counts_polls() {
    let store = MetricStore::new();
    let s = sample();

    collector::record(&store, &s, 0.25);
    collector::record(&store, &s, 0.75);

    for (name, _) in GAUGES {
        assert!(store.gauge(name).is_some(), "{name} missing");
    }
    assert_eq!(store.gauge("Alloc"), Some(600.0));
    assert_eq!(store.gauge("HeapObjects"), Some(6.0));
    assert_eq!(store.gauge("TotalAlloc"), Some(1000.0));
    assert_eq!(store.gauge("CPUutilization"), Some(12.5));
    assert_eq!(store.gauge("RandomValue"), Some(0.75));
    assert_eq!(store.counter("PollCount"), Some(2));
    assert_eq!(store.len(), GAUGES.len() + 2);
}

#[test]
fn non_finite_readings_are_skipped() {
    let store = MetricStore::new();
    let s = Sample {
        cpu_percent: f32::NAN,
        ..sample()
    };

    collector::record(&store, &s, 0.5);
    assert_eq!(store.gauge("CPUutilization"), None);
    assert_eq!(store.gauge("Sys"), Some(4096.0));
}

#[test]
fn gauge_names_are_unique() {
    let mut names: Vec<&str> = GAUGES.iter().map(|(n, _)| *n).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), GAUGES.len());
}

#[test]
fn live_poll_populates_store() {
    let store = MetricStore::new();
    let mut c = Collector::new();

    c.poll(&store);
    c.poll(&store);

    assert_eq!(store.counter("PollCount"), Some(2));
    let r = store.gauge("RandomValue").unwrap();
    assert!((0.0..1.0).contains(&r));
    assert!(store.gauge("TotalMemory").unwrap() > 0.0);
}
