//! Lightweight in-process metrics.
//!
//! Stored as atomics and rendered in Prometheus text format by `/metrics`.

pub mod metrics;

pub use metrics::GatewayMetrics;
