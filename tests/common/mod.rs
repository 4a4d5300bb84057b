//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use authz_filters::config::AppConfig;
use authz_filters::filters::{AccessPolicy, FilterLog, ServiceRegistry};
use authz_filters::{HttpServer, Shutdown};
use tokio::net::TcpListener;

pub const ROUTES: [&str; 6] = [
    "check-authorizationfilter-without-parameter",
    "check-async-authorizationfilter-without-parameter",
    "check-async-authorizationfilter-with-parameter",
    "check-async-authorizationfilter-with-parameter-and-dependency",
    "check-access-with-servicefilter",
    "check-access-with-attribute",
];

/// Records every filter log line.
#[derive(Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl RecordingLog {
    pub fn lines(&self) -> Vec<(String, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, m)| m).collect()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

impl FilterLog for RecordingLog {
    fn info(&self, category: &str, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((category.to_string(), message.to_string()));
    }
}

/// A running server. Dropping it stops the server.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, route: &str) -> String {
        format!("http://{}/api/authorizationfilter/{}", self.addr, route)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

/// Start the server from `config` on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(config: AppConfig) -> TestServer {
    let server = HttpServer::new(config).unwrap();
    spawn(server).await
}

/// Start the server with a custom policy and log sink.
#[allow(dead_code)]
pub async fn start_server_with(
    config: AppConfig,
    policy: Arc<dyn AccessPolicy>,
    log: Arc<dyn FilterLog>,
) -> TestServer {
    let registry = Arc::new(ServiceRegistry::with_default_services(policy, log));
    let server = HttpServer::with_registry(config, registry).unwrap();
    spawn(server).await
}

async fn spawn(server: HttpServer) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
