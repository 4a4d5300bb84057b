//! Authorization filter pipeline.
//!
//! # Data Flow
//! ```text
//! Incoming request (per route):
//!     → context.rs (FilterContext with an empty result slot)
//!     → action.rs (on_action_executing)
//!     → authorization.rs (stages in registration order)
//!          stage sets ctx.result → stop, respond with the result
//!     → handler (only when the slot is still empty)
//!     → action.rs (on_action_executed)
//! ```
//!
//! # Design Decisions
//! - Filters are built per request from factories; collaborators are shared `Arc`s
//! - Registrations are checked when the pipeline is built, not per request
//! - The pass/fail rule lives behind [`AccessPolicy`] and is a placeholder

pub mod action;
pub mod attribute;
pub mod authorization;
pub mod context;
pub mod logger;
pub mod pipeline;
pub mod policy;
pub mod registry;

pub use action::{ActionFilter, LoggingActionFilter};
pub use attribute::CustomAuthorization;
pub use authorization::{
    handle_request, AsyncAuthorizationFilter, AuthorizationAsyncFilter,
    AuthorizationAsyncFilterWithParameter, AuthorizationAsyncFilterWithParameterAndDependency,
    AuthorizationAsyncFilterWithoutParameter, AuthorizationFilter,
    AuthorizationFilterWithParameter, AuthorizationFilterWithoutParameter,
};
pub use context::{Decision, DenialPayload, FilterContext, FilterResult, DENIAL_MESSAGE};
pub use logger::{FilterLog, Logger, TracingLog};
pub use pipeline::{FilterError, FilterPipeline, FilterRegistration, FilterStage, PipelineBuilder};
pub use policy::{AccessPolicy, RandomPolicy, StaticPolicy, Verdict};
pub use registry::ServiceRegistry;
