#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use metrix_core::protocol::WireMetric;
use metrix_core::{MetricStore, Snapshot};

#[test]
fn counter_accumulates() {
    let s = MetricStore::new();
    for _ in 0..3 {
        s.increment_counter("PollCount", 1);
    }
    assert_eq!(s.counter("PollCount"), Some(3));
    assert_eq!(s.counter("missing"), None);
}

#[test]
fn counter_wraps_at_u64() {
    let s = MetricStore::new();
    s.increment_counter("c", u64::MAX);
    assert_eq!(s.increment_counter("c", 2), 1);
}

#[test]
fn gauge_last_write_wins() {
    let s = MetricStore::new();
    s.update_gauge("Alloc", 100.0);
    s.update_gauge("Alloc", 250.5);
    assert_eq!(s.gauge("Alloc"), Some(250.5));
}

#[test]
fn same_name_kinds_are_independent() {
    let s = MetricStore::new();
    s.increment_counter("x", 5);
    s.update_gauge("x", -1.5);
    assert_eq!(s.counter("x"), Some(5));
    assert_eq!(s.gauge("x"), Some(-1.5));
    assert_eq!(s.len(), 2);
}

#[test]
fn merge_adds_counters_and_replaces_gauges() {
    let s = MetricStore::new();
    s.increment_counter("c", 10);
    s.update_gauge("g", 1.0);

    let mut incoming = Snapshot::default();
    incoming.counter.insert("c".into(), 5);
    incoming.counter.insert("new".into(), 1);
    incoming.gauge.insert("g".into(), 2.0);
    s.merge(&incoming);

    assert_eq!(s.counter("c"), Some(15));
    assert_eq!(s.counter("new"), Some(1));
    assert_eq!(s.gauge("g"), Some(2.0));
}

#[test]
fn gauge_merge_is_idempotent() {
    let s = MetricStore::new();
    let mut incoming = Snapshot::default();
    incoming.gauge.insert("g".into(), 42.0);
    s.merge(&incoming);
    let once = s.snapshot();
    s.merge(&incoming);
    assert_eq!(s.snapshot(), once);
}

#[test]
fn replace_discards_previous_state() {
    let s = MetricStore::new();
    s.increment_counter("old", 1);
    let mut restored = Snapshot::default();
    restored.counter.insert("c".into(), 3);
    s.replace(restored.clone());
    assert_eq!(s.snapshot(), restored);
    assert_eq!(s.counter("old"), None);
}

#[test]
fn snapshot_json_round_trip() {
    let s = MetricStore::new();
    s.increment_counter("c", u64::MAX);
    s.update_gauge("g", 0.1 + 0.2);
    s.update_gauge("neg", -1234567890.123456789);
    let snap = s.snapshot();

    let json = serde_json::to_string_pretty(&snap).unwrap();
    let back: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);

    let empty: Snapshot = serde_json::from_str(r#"{"counter":{},"gauge":{}}"#).unwrap();
    assert!(empty.is_empty());
    let partial: Snapshot = serde_json::from_str(r#"{"counter":{"c":3}}"#).unwrap();
    assert_eq!(partial.counter["c"], 3);
}

#[test]
fn batch_fold_matches_sequential_apply() {
    let batch = vec![
        WireMetric::counter("c", 1),
        WireMetric::gauge("g", 1.0),
        WireMetric::counter("c", 2),
        WireMetric::gauge("g", 3.0),
    ];

    let folded = MetricStore::new();
    folded.merge(&Snapshot::from_metrics(&batch));

    let seq = MetricStore::new();
    for m in &batch {
        if let Some(d) = m.counter_delta() {
            seq.increment_counter(&m.id, d);
        }
        if let Some(v) = m.gauge_value() {
            seq.update_gauge(&m.id, v);
        }
    }
    assert_eq!(folded.snapshot(), seq.snapshot());
    assert_eq!(folded.counter("c"), Some(3));
    assert_eq!(folded.gauge("g"), Some(3.0));
}

#[test]
fn snapshot_flattens_to_metrics() {
    let mut snap = Snapshot::default();
    snap.counter.insert("b".into(), 2);
    snap.gauge.insert("a".into(), 1.0);
    let ms = snap.to_metrics();
    assert_eq!(ms, vec![WireMetric::counter("b", 2), WireMetric::gauge("a", 1.0)]);
    assert_eq!(Snapshot::from_metrics(&ms), snap);
}

#[test]
fn concurrent_increments_are_not_lost() {
    let s = Arc::new(MetricStore::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let s = Arc::clone(&s);
            thread::spawn(move || {
                for _ in 0..1000 {
                    s.increment_counter("hits", 1);
                    s.update_gauge("g", 1.0);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(s.counter("hits"), Some(8000));
}
