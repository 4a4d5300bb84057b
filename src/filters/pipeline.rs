//! Ordered filter pipeline for one endpoint.
//!
//! # Execution
//! ```text
//! execute(ctx, handler)
//!     → action filters: on_action_executing (registration order)
//!     → authorization stages (registration order, async stages awaited)
//!          result set → stop; handler future is never created
//!     → handler (slot still empty)
//!     → action filters: on_action_executed (reverse order)
//! ```

use std::any::{type_name, TypeId};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::filters::action::ActionFilter;
use crate::filters::authorization::{AsyncAuthorizationFilter, AuthorizationFilter};
use crate::filters::context::{Decision, FilterContext};
use crate::filters::registry::ServiceRegistry;
use crate::observability::metrics;

/// Builds one authorization stage for one request.
pub type StageFactory = Arc<dyn Fn(&ServiceRegistry) -> FilterStage + Send + Sync>;

/// Errors raised while assembling a pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("service filter {type_name} is not registered")]
    ServiceNotRegistered { type_name: &'static str },
}

/// A constructed authorization filter, sync or async.
pub enum FilterStage {
    Sync(Box<dyn AuthorizationFilter>),
    Async(Box<dyn AsyncAuthorizationFilter>),
}

impl FilterStage {
    /// Run the filter against the context, suspending only for async filters.
    pub async fn run(&self, ctx: &mut FilterContext) {
        match self {
            FilterStage::Sync(filter) => filter.on_authorization(ctx),
            FilterStage::Async(filter) => filter.on_authorization_async(ctx).await,
        }
    }

    pub fn parameter(&self) -> Option<&str> {
        match self {
            FilterStage::Sync(filter) => filter.parameter(),
            FilterStage::Async(filter) => filter.parameter(),
        }
    }
}

/// How an authorization filter is attached to an endpoint.
pub enum FilterRegistration {
    /// Constructed per request with explicit arguments; collaborators come
    /// from the registry.
    Type(StageFactory),
    /// Resolved from the registry by type.
    Service {
        type_id: TypeId,
        type_name: &'static str,
    },
}

impl FilterRegistration {
    pub fn type_filter<F>(factory: F) -> Self
    where
        F: Fn(&ServiceRegistry) -> FilterStage + Send + Sync + 'static,
    {
        FilterRegistration::Type(Arc::new(factory))
    }

    pub fn service<T: 'static>() -> Self {
        FilterRegistration::Service {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    fn resolve(self, registry: &ServiceRegistry) -> Result<StageFactory, FilterError> {
        match self {
            FilterRegistration::Type(factory) => Ok(factory),
            FilterRegistration::Service { type_id, type_name } => registry
                .scoped_factory(type_id)
                .ok_or(FilterError::ServiceNotRegistered { type_name }),
        }
    }
}

/// Collects registrations for one endpoint.
pub struct PipelineBuilder {
    handler_name: String,
    registry: Arc<ServiceRegistry>,
    authorization: Vec<FilterRegistration>,
    actions: Vec<Arc<dyn ActionFilter>>,
}

impl PipelineBuilder {
    /// Append an authorization filter. Stages run in the order they are added.
    pub fn authorize(mut self, registration: impl Into<FilterRegistration>) -> Self {
        self.authorization.push(registration.into());
        self
    }

    /// Append an action filter.
    pub fn action(mut self, filter: Arc<dyn ActionFilter>) -> Self {
        self.actions.push(filter);
        self
    }

    /// Resolve every registration against the registry.
    pub fn build(self) -> Result<FilterPipeline, FilterError> {
        let stages = self
            .authorization
            .into_iter()
            .map(|registration| registration.resolve(&self.registry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FilterPipeline {
            handler_name: self.handler_name,
            registry: self.registry,
            stages,
            actions: self.actions,
        })
    }
}

/// Filters guarding a single endpoint.
pub struct FilterPipeline {
    handler_name: String,
    registry: Arc<ServiceRegistry>,
    stages: Vec<StageFactory>,
    actions: Vec<Arc<dyn ActionFilter>>,
}

impl FilterPipeline {
    pub fn builder(handler_name: impl Into<String>, registry: Arc<ServiceRegistry>) -> PipelineBuilder {
        PipelineBuilder {
            handler_name: handler_name.into(),
            registry,
            authorization: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Construct every authorization stage the way a request would.
    pub fn stages(&self) -> Vec<FilterStage> {
        self.stages
            .iter()
            .map(|factory| factory(self.registry.as_ref()))
            .collect()
    }

    /// Run the authorization stages, stopping at the first that sets a result.
    pub async fn authorize(&self, ctx: &mut FilterContext) -> Decision {
        for factory in &self.stages {
            let stage = factory(self.registry.as_ref());
            stage.run(ctx).await;
            if ctx.is_short_circuited() {
                return Decision::ShortCircuit;
            }
        }
        Decision::Continue
    }

    /// Run the whole pipeline around `handler`.
    pub async fn execute<F, Fut>(&self, mut ctx: FilterContext, handler: F) -> Response
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Response>,
    {
        let start = Instant::now();

        for action in &self.actions {
            action.on_action_executing(&ctx);
        }

        let decision = self.authorize(&mut ctx).await;
        let response = match ctx.take_result() {
            Some(result) => result.into_response(),
            None => handler().await,
        };
        ctx.set_status(response.status());

        for action in self.actions.iter().rev() {
            action.on_action_executed(&ctx);
        }

        tracing::debug!(
            handler = %self.handler_name,
            decision = decision.as_str(),
            status = %response.status(),
            "Filter pipeline finished"
        );
        metrics::record_decision(&self.handler_name, decision, start);

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::action::LoggingActionFilter;
    use crate::filters::authorization::{
        AuthorizationAsyncFilter, AuthorizationAsyncFilterWithParameter,
        AuthorizationFilterWithoutParameter,
    };
    use crate::filters::logger::testing::RecordingLog;
    use crate::filters::policy::{AccessPolicy, StaticPolicy};
    use axum::http::{Method, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn registry(policy: StaticPolicy, sink: Arc<RecordingLog>) -> Arc<ServiceRegistry> {
        Arc::new(ServiceRegistry::with_default_services(Arc::new(policy), sink))
    }

    fn ctx() -> FilterContext {
        FilterContext::new("Controller::check_access", Method::GET, "/")
    }

    /// Counts how often it runs and optionally denies.
    struct CountingFilter {
        runs: Arc<AtomicUsize>,
        deny: bool,
    }

    impl AuthorizationFilter for CountingFilter {
        fn on_authorization(&self, ctx: &mut FilterContext) {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.deny {
                ctx.set_result(crate::filters::FilterResult::forbidden());
            }
        }
    }

    fn counting_filter(runs: &Arc<AtomicUsize>, deny: bool) -> FilterRegistration {
        let runs = runs.clone();
        FilterRegistration::type_filter(move |_| {
            FilterStage::Sync(Box::new(CountingFilter {
                runs: runs.clone(),
                deny,
            }))
        })
    }

    #[tokio::test]
    async fn test_short_circuit_stops_later_stages_and_handler() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let handler_runs = Arc::new(AtomicUsize::new(0));

        let pipeline = FilterPipeline::builder(
            "Controller::check_access",
            registry(StaticPolicy::allow(), Arc::default()),
        )
        .authorize(counting_filter(&first, true))
        .authorize(counting_filter(&second, false))
        .build()
        .unwrap();

        let hr = handler_runs.clone();
        let response = pipeline
            .execute(ctx(), move || async move {
                hr.fetch_add(1, Ordering::SeqCst);
                "Access Granted".into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(handler_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stages_run_in_order_then_handler() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let pipeline = FilterPipeline::builder(
            "Controller::check_access",
            registry(StaticPolicy::allow(), Arc::default()),
        )
        .authorize(counting_filter(&first, false))
        .authorize(FilterRegistration::type_filter(|r| {
            FilterStage::Sync(Box::new(AuthorizationFilterWithoutParameter::new(r.policy())))
        }))
        .authorize(counting_filter(&second, false))
        .build()
        .unwrap();
        assert_eq!(pipeline.stage_count(), 3);

        let response = pipeline
            .execute(ctx(), || async { (StatusCode::OK, "Access Granted").into_response() })
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logging_action_filter_logs_twice_for_both_outcomes() {
        for (policy, expected) in [
            (StaticPolicy::allow(), StatusCode::OK),
            (StaticPolicy::deny(), StatusCode::FORBIDDEN),
        ] {
            let sink = Arc::new(RecordingLog::default());
            let registry = registry(policy, sink.clone());
            let logging = Arc::new(LoggingActionFilter::new(
                registry.logger::<LoggingActionFilter>(),
            ));
            let pipeline = FilterPipeline::builder("Controller::check_access", registry.clone())
                .authorize(FilterRegistration::type_filter(|r| {
                    FilterStage::Async(Box::new(AuthorizationAsyncFilterWithParameter::new(
                        r.policy(),
                        "paramValue",
                    )))
                }))
                .action(logging)
                .build()
                .unwrap();

            let response = pipeline
                .execute(ctx(), || async { (StatusCode::OK, "Access Granted").into_response() })
                .await;

            assert_eq!(response.status(), expected);
            assert_eq!(
                sink.messages(),
                vec![
                    "Action 'Controller::check_access' is starting.",
                    "Action 'Controller::check_access' has completed.",
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_type_filter_receives_exact_argument() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let recorder = captured.clone();
        let parameter = String::from("paramValue");

        let pipeline = FilterPipeline::builder(
            "Controller::check_access3",
            registry(StaticPolicy::allow(), Arc::default()),
        )
        .authorize(FilterRegistration::type_filter(move |r| {
            let filter = AuthorizationAsyncFilterWithParameter::new(r.policy(), parameter.clone());
            recorder
                .lock()
                .unwrap()
                .push(filter.parameter().unwrap_or_default().to_string());
            FilterStage::Async(Box::new(filter))
        }))
        .build()
        .unwrap();

        // Constructed once per request.
        for _ in 0..2 {
            let mut ctx = ctx();
            pipeline.authorize(&mut ctx).await;
        }
        assert_eq!(*captured.lock().unwrap(), vec!["paramValue", "paramValue"]);
    }

    #[tokio::test]
    async fn test_service_filter_resolves_from_registry() {
        let sink = Arc::new(RecordingLog::default());
        let pipeline = FilterPipeline::builder(
            "Controller::check_access_with_service_filter",
            registry(StaticPolicy::deny(), sink.clone()),
        )
        .authorize(FilterRegistration::service::<AuthorizationAsyncFilter>())
        .build()
        .unwrap();

        let mut ctx = ctx();
        assert_eq!(pipeline.authorize(&mut ctx).await, Decision::ShortCircuit);
        assert_eq!(
            sink.messages(),
            vec!["Inside Authorization Filter with dependency"]
        );
    }

    #[test]
    fn test_unregistered_service_fails_at_build() {
        let policy: Arc<dyn AccessPolicy> = Arc::new(StaticPolicy::allow());
        let empty = Arc::new(ServiceRegistry::new(policy, Arc::new(RecordingLog::default())));

        let err = FilterPipeline::builder("h", empty)
            .authorize(FilterRegistration::service::<AuthorizationAsyncFilter>())
            .build()
            .err()
            .unwrap();

        assert!(matches!(err, FilterError::ServiceNotRegistered { .. }));
        assert!(err.to_string().contains("AuthorizationAsyncFilter"));
    }
}
