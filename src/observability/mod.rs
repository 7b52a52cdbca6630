//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client / finalizer / orchestrator produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters per operation and outcome)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Every checkout attempt logs its transaction ID for correlation
//! - Auth tokens and wallet keys are never logged
//! - Metrics are cheap counters; recording without an exporter is a no-op

pub mod logging;
pub mod metrics;
