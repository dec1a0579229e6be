//! metrix agent library entry.
//!
//! Samples process and host statistics into a local `MetricStore` and
//! reports them to a metrix server over HTTP.

pub mod agent;
pub mod collector;
pub mod config;
pub mod sender;

pub use agent::Agent;
pub use collector::Collector;
pub use sender::{HttpSender, Sender};
