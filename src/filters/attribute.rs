//! Declarative wrapper around the parameter-and-dependency filter.

use crate::filters::authorization::AuthorizationAsyncFilterWithParameterAndDependency;
use crate::filters::pipeline::{FilterRegistration, FilterStage};

/// Attach [`AuthorizationAsyncFilterWithParameterAndDependency`] with a fixed
/// argument, without spelling out the factory at the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAuthorization {
    parameters: String,
}

impl CustomAuthorization {
    pub fn new(parameters: impl Into<String>) -> Self {
        Self {
            parameters: parameters.into(),
        }
    }

    pub fn parameters(&self) -> &str {
        &self.parameters
    }
}

impl From<CustomAuthorization> for FilterRegistration {
    fn from(attribute: CustomAuthorization) -> Self {
        let parameters = attribute.parameters;
        FilterRegistration::type_filter(move |registry| {
            FilterStage::Async(Box::new(
                AuthorizationAsyncFilterWithParameterAndDependency::new(
                    registry.logger::<AuthorizationAsyncFilterWithParameterAndDependency>(),
                    registry.policy(),
                    parameters.clone(),
                ),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::context::FilterContext;
    use crate::filters::logger::testing::RecordingLog;
    use crate::filters::policy::StaticPolicy;
    use crate::filters::registry::ServiceRegistry;
    use crate::filters::FilterPipeline;
    use axum::http::Method;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_attribute_expands_to_dependency_filter() {
        let sink = Arc::new(RecordingLog::default());
        let registry = Arc::new(ServiceRegistry::new(
            Arc::new(StaticPolicy::deny()),
            sink.clone(),
        ));
        let pipeline = FilterPipeline::builder("Controller::check_access_with_attribute", registry)
            .authorize(CustomAuthorization::new("param"))
            .build()
            .unwrap();

        let mut ctx = FilterContext::new(pipeline.handler_name(), Method::GET, "/");
        pipeline.authorize(&mut ctx).await;

        assert!(ctx.is_short_circuited());
        assert_eq!(
            sink.lines(),
            vec![(
                "AuthorizationAsyncFilterWithParameterAndDependency".to_string(),
                "Inside Authorization Filter with dependency and parameter".to_string()
            )]
        );
    }

    #[test]
    fn test_parameters_are_kept_verbatim() {
        assert_eq!(CustomAuthorization::new("param").parameters(), "param");
    }
}
