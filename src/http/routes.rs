//! Authorization filter endpoints.
//!
//! Every endpoint returns the same body; they only differ in how their
//! authorization filter is attached.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, MethodRouter},
    Router,
};

use crate::config::FilterConfig;
use crate::filters::{
    ActionFilter, AuthorizationAsyncFilter, AuthorizationAsyncFilterWithParameter,
    AuthorizationAsyncFilterWithParameterAndDependency, AuthorizationAsyncFilterWithoutParameter,
    AuthorizationFilterWithoutParameter, CustomAuthorization, FilterError, FilterPipeline,
    FilterRegistration, FilterStage, LoggingActionFilter, PipelineBuilder, ServiceRegistry,
};
use crate::http::middleware::filter_middleware;

/// Mount point of the endpoints below.
pub const API_PREFIX: &str = "/api/authorizationfilter";

/// Body of every request that reaches its handler.
pub const ACCESS_GRANTED: &str = "Access Granted";

const CONTROLLER: &str = "AuthorizationFilterController";

/// Build the endpoint router. Fails if a service filter is not registered.
pub fn authorization_filter_routes(
    config: &FilterConfig,
    registry: Arc<ServiceRegistry>,
) -> Result<Router, FilterError> {
    let mut router = Router::new();
    for (path, pipeline) in endpoints(config, registry)? {
        let parameters: Vec<String> = pipeline
            .stages()
            .iter()
            .filter_map(|stage| stage.parameter().map(str::to_string))
            .collect();
        tracing::debug!(
            path = %format!("{API_PREFIX}{path}"),
            handler = %pipeline.handler_name(),
            stages = pipeline.stage_count(),
            parameters = ?parameters,
            "Endpoint registered"
        );
        router = router.route(path, guarded(pipeline));
    }

    Ok(router)
}

/// Route table: each path with the pipeline guarding it.
pub fn endpoints(
    config: &FilterConfig,
    registry: Arc<ServiceRegistry>,
) -> Result<Vec<(&'static str, FilterPipeline)>, FilterError> {
    let logging: Option<Arc<dyn ActionFilter>> = if config.logging_enabled {
        Some(Arc::new(LoggingActionFilter::new(
            registry.logger::<LoggingActionFilter>(),
        )))
    } else {
        None
    };

    let endpoint = |action: &str| -> PipelineBuilder {
        let builder = FilterPipeline::builder(format!("{CONTROLLER}::{action}"), registry.clone());
        match &logging {
            Some(filter) => builder.action(filter.clone()),
            None => builder,
        }
    };

    let parameter = config.parameter.clone();
    let dependency_parameter = config.parameter.clone();

    let table = [
        (
            "/check-authorizationfilter-without-parameter",
            endpoint("check_access")
                .authorize(FilterRegistration::type_filter(|r| {
                    FilterStage::Sync(Box::new(AuthorizationFilterWithoutParameter::new(
                        r.policy(),
                    )))
                }))
                .build()?,
        ),
        (
            "/check-async-authorizationfilter-without-parameter",
            endpoint("check_access2")
                .authorize(FilterRegistration::type_filter(|r| {
                    FilterStage::Async(Box::new(AuthorizationAsyncFilterWithoutParameter::new(
                        r.policy(),
                    )))
                }))
                .build()?,
        ),
        (
            "/check-async-authorizationfilter-with-parameter",
            endpoint("check_access3")
                .authorize(FilterRegistration::type_filter(move |r| {
                    FilterStage::Async(Box::new(AuthorizationAsyncFilterWithParameter::new(
                        r.policy(),
                        parameter.clone(),
                    )))
                }))
                .build()?,
        ),
        (
            "/check-async-authorizationfilter-with-parameter-and-dependency",
            endpoint("check_access4")
                .authorize(FilterRegistration::type_filter(move |r| {
                    FilterStage::Async(Box::new(
                        AuthorizationAsyncFilterWithParameterAndDependency::new(
                            r.logger::<AuthorizationAsyncFilterWithParameterAndDependency>(),
                            r.policy(),
                            dependency_parameter.clone(),
                        ),
                    ))
                }))
                .build()?,
        ),
        (
            "/check-access-with-servicefilter",
            endpoint("check_access_with_service_filter")
                .authorize(FilterRegistration::service::<AuthorizationAsyncFilter>())
                .build()?,
        ),
        (
            "/check-access-with-attribute",
            endpoint("check_access_with_attribute")
                .authorize(CustomAuthorization::new(config.attribute_parameter.clone()))
                .build()?,
        ),
    ];

    Ok(Vec::from(table))
}

fn guarded(pipeline: FilterPipeline) -> MethodRouter {
    get(check_access).route_layer(middleware::from_fn_with_state(
        Arc::new(pipeline),
        filter_middleware,
    ))
}

async fn check_access() -> impl IntoResponse {
    (StatusCode::OK, ACCESS_GRANTED)
}
