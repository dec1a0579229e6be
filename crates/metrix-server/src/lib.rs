//! metrix server library entry.
//!
//! This crate wires config, the HTTP ingestion/query API, and snapshot
//! persistence around a shared `MetricStore`. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod ops;
pub mod persist;
pub mod router;
