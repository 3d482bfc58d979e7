//! Infrastructure adapters: process flags, the redis-backed store and
//! broker, the Postmark mail client, and the metrics endpoint.

pub mod config;
pub mod metrics;
pub mod postmark;
pub mod redis;

pub use config::Flags;
pub use metrics::Metrics;
