#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

//! Runs against a live PostgreSQL only when `DATABASE_DSN` is set.

use metrix_core::Snapshot;
use metrix_server::persist::{Backend, BackendKind, PostgresBackend};

fn dsn() -> Option<String> {
    std::env::var("DATABASE_DSN").ok().filter(|s| !s.is_empty())
}

#[tokio::test]
async fn save_then_load_keeps_full_counter_range() {
    let Some(dsn) = dsn() else {
        eprintln!("DATABASE_DSN not set, skipping");
        return;
    };
    let backend = PostgresBackend::connect(&dsn).await.unwrap();
    assert_eq!(backend.kind(), BackendKind::Database);
    backend.ping().await.unwrap();

    let mut snap = Snapshot::default();
    snap.counter.insert("pg_rt_big".into(), u64::MAX - 3);
    snap.counter.insert("pg_rt_small".into(), 7);
    snap.gauge.insert("pg_rt_gauge".into(), 0.1 + 0.2);
    backend.save(&snap).await.unwrap();

    let loaded = backend.load().await.unwrap().expect("rows present");
    assert_eq!(loaded.counter.get("pg_rt_big"), Some(&(u64::MAX - 3)));
    assert_eq!(loaded.counter.get("pg_rt_small"), Some(&7));
    assert_eq!(loaded.gauge.get("pg_rt_gauge"), Some(&(0.1 + 0.2)));
}

#[tokio::test]
async fn second_save_overwrites_rows() {
    let Some(dsn) = dsn() else {
        eprintln!("DATABASE_DSN not set, skipping");
        return;
    };
    let backend = PostgresBackend::connect(&dsn).await.unwrap();

    let mut snap = Snapshot::default();
    snap.counter.insert("pg_upsert".into(), 1);
    backend.save(&snap).await.unwrap();
    snap.counter.insert("pg_upsert".into(), 42);
    backend.save(&snap).await.unwrap();

    let loaded = backend.load().await.unwrap().unwrap();
    assert_eq!(loaded.counter.get("pg_upsert"), Some(&42));
}
