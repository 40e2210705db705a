//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::Router;
use lookup_service::config::ServiceConfig;
use lookup_service::health::{DependencyMonitor, DependencyRegistry, ReadinessState};
use lookup_service::http::{build_router, AppState};
use lookup_service::lifecycle::{LifecycleCoordinator, RunningService};
use tokio::net::TcpListener;

/// Default config bound to an ephemeral loopback port.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

/// Start the full service with `config`, probing dependencies once before
/// the listener opens.
pub async fn start_service(config: ServiceConfig) -> RunningService {
    let readiness = ReadinessState::new();
    let dependencies = DependencyRegistry::from_config(&config.dependencies);
    DependencyMonitor::new(dependencies.clone(), &config.health_check)
        .check_all()
        .await;

    let state = AppState::new(&config, readiness.clone(), dependencies);
    let router = build_router(&config, state);
    start_router(config, router, readiness).await
}

/// Start an arbitrary router under the lifecycle coordinator.
#[allow(dead_code)]
pub async fn start_router(
    config: ServiceConfig,
    router: Router,
    readiness: ReadinessState,
) -> RunningService {
    LifecycleCoordinator::new(&config, router, readiness)
        .start()
        .await
        .unwrap()
}

/// Client without connection pooling or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A listener that accepts TCP connections, standing in for a dependency.
#[allow(dead_code)]
pub async fn start_dependency() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
