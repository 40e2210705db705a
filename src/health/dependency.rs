//! Active dependency health checking.
//!
//! # Responsibilities
//! - Periodically probe every configured dependency with a TCP connect
//! - Cache the latest result for the readiness probe and lookups
//!
//! A dependency starts out down; the first probe runs immediately when the
//! monitor starts, so readiness only opens once each one has answered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::{DependencyConfig, HealthCheckConfig};
use crate::observability::metrics;

/// Cached reachability of one downstream dependency.
#[derive(Debug)]
pub struct Dependency {
    pub name: String,
    pub address: String,
    up: AtomicBool,
}

impl Dependency {
    pub fn new(config: &DependencyConfig) -> Self {
        Self {
            name: config.name.clone(),
            address: config.address.clone(),
            up: AtomicBool::new(false),
        }
    }

    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::Acquire)
    }

    /// Store a probe result, returning true when it changed the state.
    pub fn record(&self, up: bool) -> bool {
        self.up.swap(up, Ordering::AcqRel) != up
    }
}

/// Set of monitored dependencies, shared between the monitor and handlers.
#[derive(Debug, Clone, Default)]
pub struct DependencyRegistry {
    dependencies: Arc<Vec<Dependency>>,
}

impl DependencyRegistry {
    pub fn from_config(configs: &[DependencyConfig]) -> Self {
        Self {
            dependencies: Arc::new(configs.iter().map(Dependency::new).collect()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    /// First dependency currently reported down, if any.
    pub fn first_down(&self) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| !d.is_up())
    }

    pub fn all_up(&self) -> bool {
        self.first_down().is_none()
    }
}

/// Background prober for the dependency registry.
pub struct DependencyMonitor {
    registry: DependencyRegistry,
    interval: Duration,
    timeout: Duration,
}

impl DependencyMonitor {
    pub fn new(registry: DependencyRegistry, config: &HealthCheckConfig) -> Self {
        Self {
            registry,
            interval: Duration::from_secs(config.interval_secs),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Probe on every tick until the shutdown broadcast fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if self.registry.is_empty() {
            tracing::info!("No dependencies configured, monitor not started");
            return;
        }

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            dependencies = self.registry.dependencies.len(),
            "Dependency monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Dependency monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every dependency once.
    pub async fn check_all(&self) {
        for dep in self.registry.iter() {
            let up = match time::timeout(self.timeout, TcpStream::connect(&dep.address)).await {
                Ok(Ok(_stream)) => true,
                Ok(Err(e)) => {
                    tracing::debug!(dependency = %dep.name, address = %dep.address, error = %e, "Dependency probe failed: connection error");
                    false
                }
                Err(_) => {
                    tracing::debug!(dependency = %dep.name, address = %dep.address, "Dependency probe failed: timeout");
                    false
                }
            };

            if dep.record(up) {
                if up {
                    tracing::info!(dependency = %dep.name, address = %dep.address, "Dependency is up");
                } else {
                    tracing::warn!(dependency = %dep.name, address = %dep.address, "Dependency is down");
                }
            }

            metrics::record_dependency_health(&dep.name, up);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn config(name: &str, address: String) -> DependencyConfig {
        DependencyConfig { name: name.into(), address }
    }

    fn fast_checks() -> HealthCheckConfig {
        HealthCheckConfig { interval_secs: 1, timeout_ms: 200 }
    }

    #[test]
    fn test_empty_registry_is_all_up() {
        let registry = DependencyRegistry::default();
        assert!(registry.all_up());
        assert!(registry.first_down().is_none());
    }

    #[test]
    fn test_dependencies_start_down() {
        let registry = DependencyRegistry::from_config(&[config("db", "127.0.0.1:1".into())]);
        assert!(!registry.all_up());
        assert_eq!(registry.first_down().map(|d| d.name.as_str()), Some("db"));
    }

    #[test]
    fn test_record_reports_transitions() {
        let dep = Dependency::new(&config("db", "127.0.0.1:1".into()));
        assert!(dep.record(true));
        assert!(!dep.record(true));
        assert!(dep.record(false));
    }

    #[tokio::test]
    async fn test_check_all_marks_reachable_and_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let live_addr = listener.local_addr().unwrap();

        // Grab a free port and release it so nothing is listening there.
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = closed.local_addr().unwrap();
        drop(closed);

        let registry = DependencyRegistry::from_config(&[
            config("cache", live_addr.to_string()),
            config("db", dead_addr.to_string()),
        ]);
        let monitor = DependencyMonitor::new(registry.clone(), &fast_checks());
        monitor.check_all().await;

        let states: Vec<_> = registry.iter().map(|d| (d.name.as_str(), d.is_up())).collect();
        assert_eq!(states, vec![("cache", true), ("db", false)]);
        assert_eq!(registry.first_down().map(|d| d.name.as_str()), Some("db"));
    }

    #[tokio::test]
    async fn test_check_all_publishes_dependency_gauge() {
        use crate::observability::metrics::testing::gauge;
        use metrics_util::debugging::DebuggingRecorder;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = closed.local_addr().unwrap();
        drop(closed);

        let registry = DependencyRegistry::from_config(&[
            config("cache", listener.local_addr().unwrap().to_string()),
            config("db", dead_addr.to_string()),
        ]);
        let monitor = DependencyMonitor::new(registry, &fast_checks());

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let _guard = ::metrics::set_default_local_recorder(&recorder);
        monitor.check_all().await;

        assert_eq!(gauge(&snapshotter, "lookup_dependency_up", &[("dependency", "cache")]), Some(1.0));
        assert_eq!(gauge(&snapshotter, "lookup_dependency_up", &[("dependency", "db")]), Some(0.0));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let registry = DependencyRegistry::from_config(&[config(
            "cache",
            listener.local_addr().unwrap().to_string(),
        )]);
        let monitor = DependencyMonitor::new(registry.clone(), &fast_checks());

        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(monitor.run(rx));

        // The first tick fires immediately.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(registry.all_up());

        tx.send(()).unwrap();
        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(joined.is_ok(), "monitor should exit after shutdown");
    }
}
