//! HTTP router setup.
//!
//! # Responsibilities
//! - Create the Axum router with the lookup and probe handlers
//! - Wire up middleware (request ID, tracing, timeout, metrics, headers)
//! - Run the accept loop, one owned task per connection (HTTP/1.1 and HTTP/2)
//!
//! Binding and the drain policy belong to the lifecycle coordinator.

use std::time::Duration;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::{conn::auto::Builder, graceful::GracefulShutdown},
    service::TowerToHyperService,
};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::health::{DependencyRegistry, FaultInjector, ReadinessState};
use crate::http::handlers;
use crate::http::headers::with_standard_headers;
use crate::http::request::UuidRequestId;
use crate::lifecycle::Shutdown;
use crate::observability::{metrics, tracing::request_span};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub readiness: ReadinessState,
    pub dependencies: DependencyRegistry,
    pub faults: FaultInjector,
}

impl AppState {
    pub fn new(config: &ServiceConfig, readiness: ReadinessState, dependencies: DependencyRegistry) -> Self {
        Self {
            readiness,
            dependencies,
            faults: FaultInjector::new(config.faults.failure_rate),
        }
    }
}

/// Build the Axum router with all middleware layers.
///
/// Probes answer any method; the lookup is GET (and HEAD) only.
pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
    let routes = Router::new()
        .route("/live", any(handlers::live))
        .route("/ready", any(handlers::ready))
        .route("/{id}", get(handlers::lookup))
        .with_state(state);

    with_middleware(routes, Duration::from_secs(config.timeouts.request_secs))
}

/// Wrap `routes` in the request pipeline.
///
/// Metrics sit outside the timeout so a 408 is counted like any other status.
#[allow(deprecated)]
pub fn with_middleware(routes: Router, request_timeout: Duration) -> Router {
    let router = routes
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    with_standard_headers(router)
}

/// Accept connections on `listener` until `shutdown` fires, then close them
/// gracefully and wait for in-flight requests.
///
/// Every connection runs in a task owned by this future. Dropping the future
/// (for instance by aborting the task it runs on) aborts all of them.
pub async fn serve(listener: TcpListener, router: Router, shutdown: Shutdown) {
    let builder = Builder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    let mut connections = JoinSet::new();

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
            },
            _ = shutdown.wait() => break,
        };

        let service = TowerToHyperService::new(router.clone());
        let conn = builder
            .serve_connection(TokioIo::new(stream), service)
            .into_owned();
        let conn = graceful.watch(conn);
        connections.spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(peer = %peer, error = %e, "Connection closed with error");
            }
        });

        // Reap finished connections.
        while connections.try_join_next().is_some() {}
    }

    drop(listener);
    tracing::debug!(open = connections.len(), "Listener closed, draining connections");
    graceful.shutdown().await;
    while connections.join_next().await.is_some() {}
}
