//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the filter registry from configuration
//! - Create Axum Router with all endpoints and their filter pipelines
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::filters::policy::policy_from_config;
use crate::filters::{FilterError, ServiceRegistry, TracingLog};
use crate::http::routes::{authorization_filter_routes, API_PREFIX};
use crate::lifecycle::ShutdownSignal;

/// HTTP server exposing the filter endpoints.
pub struct HttpServer {
    router: Router,
    registry: Arc<ServiceRegistry>,
}

impl HttpServer {
    /// Create a server with the policy selected in `config` and tracing-backed loggers.
    pub fn new(config: AppConfig) -> Result<Self, FilterError> {
        let policy = policy_from_config(&config.policy);
        let registry = Arc::new(ServiceRegistry::with_default_services(
            policy,
            Arc::new(TracingLog),
        ));
        Self::with_registry(config, registry)
    }

    /// Create a server around an already assembled registry.
    pub fn with_registry(
        config: AppConfig,
        registry: Arc<ServiceRegistry>,
    ) -> Result<Self, FilterError> {
        let router = Self::build_router(&config, registry.clone())?;
        Ok(Self { router, registry })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, registry: Arc<ServiceRegistry>) -> Result<Router, FilterError> {
        let api = authorization_filter_routes(&config.filters, registry)?;

        Ok(Router::new()
            .nest(API_PREFIX, api)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
    }

    /// Run the server until `shutdown` fires or Ctrl+C is received.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            services = ?self.registry.service_names(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Router with every layer applied, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Wait for the shutdown signal or Ctrl+C.
async fn shutdown_signal(mut shutdown: ShutdownSignal) {
    tokio::select! {
        reason = shutdown.recv() => {
            tracing::info!(reason = ?reason, "Shutdown requested");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                let reason = shutdown.recv().await;
                tracing::info!(reason = ?reason, "Shutdown requested");
                return;
            }
            tracing::info!("Shutdown signal received");
        }
    }
}
