#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use metrix_agent::{Agent, Collector, Sender};
use metrix_core::error::{MetrixError, Result};
use metrix_core::protocol::WireMetric;
use metrix_core::Snapshot;

/// Records every report; the first `fail_first` calls error out.
#[derive(Default)]
struct MockSender {
    fail_first: usize,
    calls: Mutex<Vec<Vec<WireMetric>>>,
}

impl MockSender {
    fn reports(&self) -> Vec<Snapshot> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|m| Snapshot::from_metrics(m))
            .collect()
    }
}

#[async_trait]
impl Sender for MockSender {
    async fn send(&self, metrics: Vec<WireMetric>) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(metrics);
        if calls.len() <= self.fail_first {
            return Err(MetrixError::DeliveryFailed("connection refused".into()));
        }
        Ok(())
    }
}

fn poll_count(s: &Snapshot) -> u64 {
    s.counter.get("PollCount").copied().unwrap_or_default()
}

#[tokio::test(start_paused = true)]
async fn reports_accumulated_state_on_schedule() {
    let sender = Arc::new(MockSender::default());
    let agent = Agent::new(sender.clone(), Duration::from_secs(2), Duration::from_secs(10));
    let store = agent.store().clone();

    let token = CancellationToken::new();
    let handle = tokio::spawn(agent.run(Collector::new(), token.clone()));

    tokio::time::sleep(Duration::from_millis(9_500)).await;
    assert!(sender.reports().is_empty());
    assert_eq!(store.counter("PollCount"), Some(4));

    tokio::time::sleep(Duration::from_secs(1)).await;
    let reports = sender.reports();
    assert_eq!(reports.len(), 1);
    let first = &reports[0];
    assert!((4..=5).contains(&poll_count(first)));
    assert!(first.gauge.contains_key("RandomValue"));
    assert!(first.gauge.contains_key("Alloc"));

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_report_keeps_counters() {
    let sender = Arc::new(MockSender {
        fail_first: 1,
        ..MockSender::default()
    });
    let agent = Agent::new(sender.clone(), Duration::from_secs(1), Duration::from_secs(5));

    let token = CancellationToken::new();
    let handle = tokio::spawn(agent.run(Collector::new(), token.clone()));

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    token.cancel();
    handle.await.unwrap();

    let reports = sender.reports();
    assert_eq!(reports.len(), 2);
    assert!(poll_count(&reports[1]) >= poll_count(&reports[0]) + 4);
}

#[tokio::test(start_paused = true)]
async fn nothing_runs_after_cancellation() {
    let sender = Arc::new(MockSender::default());
    let agent = Agent::new(sender.clone(), Duration::from_secs(1), Duration::from_secs(2));
    let store = agent.store().clone();

    let token = CancellationToken::new();
    let handle = tokio::spawn(agent.run(Collector::new(), token.clone()));
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    token.cancel();
    handle.await.unwrap();

    let polls = store.counter("PollCount");
    let reports = sender.reports().len();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(store.counter("PollCount"), polls);
    assert_eq!(sender.reports().len(), reports);
}

#[tokio::test]
async fn empty_store_sends_nothing() {
    let sender = Arc::new(MockSender::default());
    let agent = Agent::new(sender.clone(), Duration::from_secs(1), Duration::from_secs(1));

    agent.report().await.unwrap();
    assert!(sender.reports().is_empty());

    agent.store().increment_counter("PollCount", 1);
    agent.report().await.unwrap();
    assert_eq!(sender.reports().len(), 1);
}

/// Counts reports; each one takes `delay` to complete.
struct SlowSender {
    delay: Duration,
    sends: Mutex<usize>,
}

#[async_trait]
impl Sender for SlowSender {
    async fn send(&self, _metrics: Vec<WireMetric>) -> Result<()> {
        *self.sends.lock().unwrap() += 1;
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_slow_report_starts_no_new_one() {
    for _ in 0..20 {
        let sender = Arc::new(SlowSender {
            delay: Duration::from_secs(3),
            sends: Mutex::new(0),
        });
        let agent = Agent::new(sender.clone(), Duration::from_secs(1), Duration::from_secs(1));
        agent.store().increment_counter("PollCount", 1);

        let token = CancellationToken::new();
        let handle = tokio::spawn(agent.run(Collector::new(), token.clone()));

        // first report starts at t=1s and is still running at t=1.5s
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        token.cancel();
        handle.await.unwrap();

        assert_eq!(*sender.sends.lock().unwrap(), 1);
    }
}
