//! Shared collaborators and scoped filter factories.
//!
//! The registry is assembled once at startup and shared behind an `Arc`.
//! Filters registered here can be attached to routes by type alone
//! (see [`FilterRegistration::service`](crate::filters::FilterRegistration::service)).

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::filters::authorization::{
    AsyncAuthorizationFilter, AuthorizationAsyncFilter, AuthorizationFilter,
};
use crate::filters::logger::{FilterLog, Logger};
use crate::filters::pipeline::{FilterStage, StageFactory};
use crate::filters::policy::AccessPolicy;

struct ScopedService {
    type_name: &'static str,
    factory: StageFactory,
}

/// Collaborators available to filter factories.
pub struct ServiceRegistry {
    policy: Arc<dyn AccessPolicy>,
    log: Arc<dyn FilterLog>,
    scoped: HashMap<TypeId, ScopedService>,
}

impl ServiceRegistry {
    /// Empty registry: collaborators only, no scoped filters.
    pub fn new(policy: Arc<dyn AccessPolicy>, log: Arc<dyn FilterLog>) -> Self {
        Self {
            policy,
            log,
            scoped: HashMap::new(),
        }
    }

    /// Registry with the filters the HTTP surface resolves by type.
    pub fn with_default_services(policy: Arc<dyn AccessPolicy>, log: Arc<dyn FilterLog>) -> Self {
        let mut registry = Self::new(policy, log);
        registry.add_scoped_async(|r| {
            AuthorizationAsyncFilter::new(r.logger::<AuthorizationAsyncFilter>(), r.policy())
        });
        registry
    }

    pub fn policy(&self) -> Arc<dyn AccessPolicy> {
        self.policy.clone()
    }

    /// Logger categorised by `T`.
    pub fn logger<T: ?Sized>(&self) -> Logger {
        Logger::for_type::<T>(self.log.clone())
    }

    /// Register a synchronous filter built fresh for every request.
    pub fn add_scoped_sync<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: AuthorizationFilter + 'static,
        F: Fn(&ServiceRegistry) -> T + Send + Sync + 'static,
    {
        self.insert::<T>(Arc::new(move |r: &ServiceRegistry| {
            FilterStage::Sync(Box::new(factory(r)))
        }))
    }

    /// Register an asynchronous filter built fresh for every request.
    pub fn add_scoped_async<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: AsyncAuthorizationFilter + 'static,
        F: Fn(&ServiceRegistry) -> T + Send + Sync + 'static,
    {
        self.insert::<T>(Arc::new(move |r: &ServiceRegistry| {
            FilterStage::Async(Box::new(factory(r)))
        }))
    }

    fn insert<T: 'static>(&mut self, factory: StageFactory) -> &mut Self {
        if self
            .scoped
            .insert(
                TypeId::of::<T>(),
                ScopedService {
                    type_name: type_name::<T>(),
                    factory,
                },
            )
            .is_some()
        {
            tracing::warn!(service = type_name::<T>(), "Scoped filter registered twice, keeping the last one");
        }
        self
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.scoped.contains_key(&TypeId::of::<T>())
    }

    pub(crate) fn scoped_factory(&self, type_id: TypeId) -> Option<StageFactory> {
        self.scoped.get(&type_id).map(|s| s.factory.clone())
    }

    /// Type names of every scoped filter, for startup logging.
    pub fn service_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.scoped.values().map(|s| s.type_name).collect();
        names.sort_unstable();
        names
    }
}
