//! Authorization filters.
//!
//! Every filter here delegates to [`handle_request`], which asks the policy
//! and writes the fixed 403 result on deny. The variants only differ in how
//! they run (sync or async) and in what they are constructed with.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::filters::context::{FilterContext, FilterResult};
use crate::filters::logger::Logger;
use crate::filters::policy::{AccessPolicy, Verdict};

/// Synchronous authorization filter.
pub trait AuthorizationFilter: Send + Sync {
    fn on_authorization(&self, ctx: &mut FilterContext);

    /// Argument the filter was constructed with, if it takes one.
    fn parameter(&self) -> Option<&str> {
        None
    }
}

/// Asynchronous authorization filter. The pipeline awaits it before the next stage.
pub trait AsyncAuthorizationFilter: Send + Sync {
    fn on_authorization_async<'a>(&'a self, ctx: &'a mut FilterContext) -> BoxFuture<'a, ()>;

    /// Argument the filter was constructed with, if it takes one.
    fn parameter(&self) -> Option<&str> {
        None
    }
}

/// Shared decision step: on deny, short-circuit with the 403 payload.
pub fn handle_request(ctx: &mut FilterContext, policy: &dyn AccessPolicy) {
    match policy.evaluate(ctx) {
        Verdict::Deny => {
            tracing::debug!(
                handler = %ctx.handler_name(),
                request_id = ?ctx.request_id(),
                "Authorization denied"
            );
            ctx.set_result(FilterResult::forbidden());
        }
        Verdict::Allow => {}
    }
}

pub struct AuthorizationFilterWithoutParameter {
    policy: Arc<dyn AccessPolicy>,
}

impl AuthorizationFilterWithoutParameter {
    pub fn new(policy: Arc<dyn AccessPolicy>) -> Self {
        Self { policy }
    }
}

impl AuthorizationFilter for AuthorizationFilterWithoutParameter {
    fn on_authorization(&self, ctx: &mut FilterContext) {
        handle_request(ctx, self.policy.as_ref());
    }
}

pub struct AuthorizationFilterWithParameter {
    parameter: String,
    policy: Arc<dyn AccessPolicy>,
}

impl AuthorizationFilterWithParameter {
    pub fn new(policy: Arc<dyn AccessPolicy>, parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            policy,
        }
    }
}

impl AuthorizationFilter for AuthorizationFilterWithParameter {
    fn parameter(&self) -> Option<&str> {
        Some(&self.parameter)
    }

    fn on_authorization(&self, ctx: &mut FilterContext) {
        handle_request(ctx, self.policy.as_ref());
    }
}

pub struct AuthorizationAsyncFilterWithoutParameter {
    policy: Arc<dyn AccessPolicy>,
}

impl AuthorizationAsyncFilterWithoutParameter {
    pub fn new(policy: Arc<dyn AccessPolicy>) -> Self {
        Self { policy }
    }
}

impl AsyncAuthorizationFilter for AuthorizationAsyncFilterWithoutParameter {
    fn on_authorization_async<'a>(&'a self, ctx: &'a mut FilterContext) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            handle_request(ctx, self.policy.as_ref());
        })
    }
}

pub struct AuthorizationAsyncFilterWithParameter {
    parameter: String,
    policy: Arc<dyn AccessPolicy>,
}

impl AuthorizationAsyncFilterWithParameter {
    pub fn new(policy: Arc<dyn AccessPolicy>, parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            policy,
        }
    }
}

impl AsyncAuthorizationFilter for AuthorizationAsyncFilterWithParameter {
    fn parameter(&self) -> Option<&str> {
        Some(&self.parameter)
    }

    fn on_authorization_async<'a>(&'a self, ctx: &'a mut FilterContext) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            handle_request(ctx, self.policy.as_ref());
        })
    }
}

/// Takes both a manual argument and a logger resolved from the registry.
pub struct AuthorizationAsyncFilterWithParameterAndDependency {
    logger: Logger,
    parameter: String,
    policy: Arc<dyn AccessPolicy>,
}

impl AuthorizationAsyncFilterWithParameterAndDependency {
    pub fn new(logger: Logger, policy: Arc<dyn AccessPolicy>, parameter: impl Into<String>) -> Self {
        Self {
            logger,
            parameter: parameter.into(),
            policy,
        }
    }
}

impl AsyncAuthorizationFilter for AuthorizationAsyncFilterWithParameterAndDependency {
    fn parameter(&self) -> Option<&str> {
        Some(&self.parameter)
    }

    fn on_authorization_async<'a>(&'a self, ctx: &'a mut FilterContext) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.logger
                .info("Inside Authorization Filter with dependency and parameter");
            handle_request(ctx, self.policy.as_ref());
        })
    }
}

/// Collaborators only, no manual arguments: resolvable as a service filter.
pub struct AuthorizationAsyncFilter {
    logger: Logger,
    policy: Arc<dyn AccessPolicy>,
}

impl AuthorizationAsyncFilter {
    pub fn new(logger: Logger, policy: Arc<dyn AccessPolicy>) -> Self {
        Self { logger, policy }
    }
}

impl AsyncAuthorizationFilter for AuthorizationAsyncFilter {
    fn on_authorization_async<'a>(&'a self, ctx: &'a mut FilterContext) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.logger.info("Inside Authorization Filter with dependency");
            handle_request(ctx, self.policy.as_ref());
        })
    }
}
