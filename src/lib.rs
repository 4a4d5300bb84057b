//! Authorization filter pipeline sample service.
//!
//! Endpoints guarded by ordered authorization filters that may short-circuit
//! a request with a fixed 403 before its handler runs.

pub mod config;
pub mod filters;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
