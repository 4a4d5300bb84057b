//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request-id / trace / timeout layers)
//!     → routes.rs (endpoint matched, per-route filter pipeline)
//!     → middleware/filter.rs (FilterContext built, pipeline executed)
//!     → handler, or the short-circuit result
//!     → Send to client
//! ```

pub mod middleware;
pub mod routes;
pub mod server;

pub use routes::{ACCESS_GRANTED, API_PREFIX};
pub use server::HttpServer;
