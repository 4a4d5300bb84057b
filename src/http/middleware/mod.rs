//! Axum glue for the filter pipeline.

pub mod filter;

pub use filter::filter_middleware;
