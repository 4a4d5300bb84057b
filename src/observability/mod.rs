//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Filters and HTTP layers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (decision counters, latency histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the request-id layer into every filter context
//! - Metrics are cheap (atomic increments); no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
