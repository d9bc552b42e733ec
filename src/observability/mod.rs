//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! synchronizer / admin surface produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (refresh counters, durations, snapshot gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`service`, `partition`, `error`) over string
//!   interpolation so refresh failures are queryable
//! - Metric updates are cheap atomic operations; recording never fails the
//!   refresh that produced the numbers

pub mod logging;
pub mod metrics;
