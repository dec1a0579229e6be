//! metrix core: metric store, wire protocol, signing, and retry primitives.
//!
//! This crate defines the data model and wire-level contracts shared by the
//! server and the agent. It carries no HTTP or storage dependencies; tokio is
//! used only for retry timers, so the same code runs on both sides.
//!
//! # Panics
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible
//! path surfaces as `MetrixError`/`Result`; a malformed payload never takes
//! down the ingestion path.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod retry;
pub mod store;

/// Shared result type.
pub use error::{Result, MetrixError};
pub use store::{MetricStore, Snapshot};
