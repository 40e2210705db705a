//! Startup and shutdown sequencing.
//!
//! # State Machine
//! ```text
//! Created ──bind ok──▶ Serving ──signal──▶ Draining ──drained / timeout──▶ Stopped
//! ```
//!
//! - Bind failure is fatal: `start` returns the error and nothing is spawned.
//! - Draining stops the accept loop at once and flips readiness off; accepted
//!   requests keep running until they finish or the drain window closes.
//! - A drain timeout aborts the serve task, which owns every connection task,
//!   so requests still in flight are cut off. It is logged, not returned as
//!   an error: exiting anyway is the policy.

use std::fmt;
use std::future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::ServiceConfig;
use crate::health::ReadinessState;
use crate::http::serve;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_signal;

/// Position in the process lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Serving,
    Draining,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Created => "created",
            LifecycleState::Serving => "serving",
            LifecycleState::Draining => "draining",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// How the drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight request finished inside the window.
    Drained,
    /// The window elapsed; the remaining connections were aborted before
    /// `shutdown` returned.
    TimedOut,
}

/// What ended the serving phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// An OS signal, by name.
    Signal(&'static str),
    /// Another component triggered the shared [`Shutdown`].
    Requested,
    /// The serve task exited on its own.
    ServerExited,
}

/// Errors that prevent the service from starting or waiting.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to register signal handlers: {0}")]
    Signal(#[source] std::io::Error),
}

/// Owns the listener, the serve task and the drain policy.
pub struct LifecycleCoordinator {
    bind_address: String,
    drain_timeout: Duration,
    router: Router,
    readiness: ReadinessState,
    shutdown: Shutdown,
    state: watch::Sender<LifecycleState>,
}

impl LifecycleCoordinator {
    /// Create a coordinator for `router` using the listener and drain
    /// settings from `config`.
    pub fn new(config: &ServiceConfig, router: Router, readiness: ReadinessState) -> Self {
        let (state, _) = watch::channel(LifecycleState::Created);
        Self {
            bind_address: config.listener.bind_address.clone(),
            drain_timeout: config.drain_timeout(),
            router,
            readiness,
            shutdown: Shutdown::new(),
            state,
        }
    }

    /// Share an existing shutdown coordinator with background tasks.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Bind the listener and start serving on a background task.
    pub async fn start(self) -> Result<RunningService, LifecycleError> {
        let bind_error = |source| LifecycleError::Bind {
            address: self.bind_address.clone(),
            source,
        };

        let listener = TcpListener::bind(&self.bind_address).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        let server = tokio::spawn(serve(listener, self.router, self.shutdown.clone()));

        self.state.send_replace(LifecycleState::Serving);
        self.readiness.set_ready();
        tracing::info!(
            address = %local_addr,
            drain_timeout_secs = self.drain_timeout.as_secs_f64(),
            "Service running"
        );

        Ok(RunningService {
            local_addr,
            drain_timeout: self.drain_timeout,
            readiness: self.readiness,
            shutdown: self.shutdown,
            state: self.state,
            server: Some(server),
        })
    }
}

/// Handle to a started service.
pub struct RunningService {
    local_addr: SocketAddr,
    drain_timeout: Duration,
    readiness: ReadinessState,
    shutdown: Shutdown,
    state: watch::Sender<LifecycleState>,
    server: Option<JoinHandle<()>>,
}

impl RunningService {
    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Observe lifecycle transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Block until a termination signal arrives, the shared shutdown is
    /// triggered, or the serve task exits by itself.
    pub async fn wait_for_termination(&mut self) -> Result<Termination, LifecycleError> {
        let shutdown = &self.shutdown;
        let slot = &mut self.server;
        let server = async {
            match slot.as_mut() {
                Some(handle) => handle.await,
                None => future::pending().await,
            }
        };

        let exited = tokio::select! {
            signal = wait_for_signal() => {
                return signal.map(Termination::Signal).map_err(LifecycleError::Signal);
            }
            _ = shutdown.wait() => return Ok(Termination::Requested),
            exited = server => exited,
        };

        match exited {
            Ok(()) => tracing::warn!("Server exited before shutdown was requested"),
            Err(e) => tracing::error!(error = %e, "Server task failed"),
        }
        self.server = None;
        Ok(Termination::ServerExited)
    }

    /// Drain in-flight requests, bounded by the configured window.
    pub async fn shutdown(mut self) -> ShutdownOutcome {
        self.state.send_replace(LifecycleState::Draining);
        self.readiness.set_not_ready();
        tracing::info!(timeout_secs = self.drain_timeout.as_secs_f64(), "Service shutting down");
        self.shutdown.trigger();

        let outcome = match self.server.take() {
            None => ShutdownOutcome::Drained,
            Some(mut server) => match time::timeout(self.drain_timeout, &mut server).await {
                Ok(Ok(())) => ShutdownOutcome::Drained,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Server task failed during drain");
                    ShutdownOutcome::Drained
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = self.drain_timeout.as_secs_f64(),
                        "Drain timed out, forcing exit"
                    );
                    server.abort();
                    // Cancellation drops the connection set, aborting each task.
                    let _ = server.await;
                    ShutdownOutcome::TimedOut
                }
            },
        };

        self.state.send_replace(LifecycleState::Stopped);
        tracing::info!(?outcome, "Service stopped");
        outcome
    }

    /// Serve until terminated, then drain.
    pub async fn run_until_signal(mut self) -> Result<ShutdownOutcome, LifecycleError> {
        let termination = self.wait_for_termination().await?;
        tracing::info!(?termination, "Serving finished");
        Ok(self.shutdown().await)
    }
}
