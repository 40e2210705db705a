//! OS signal handling.
//!
//! SIGTERM (sent by the orchestrator) and SIGINT (Ctrl+C) both start the
//! graceful drain. SIGKILL cannot be caught and needs no handler.

/// Wait for SIGTERM or SIGINT.
///
/// Returns the name of the signal received, or an error if the handlers
/// cannot be registered.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    tracing::info!(signal = name, "Received termination signal");
    Ok(name)
}

/// Wait for Ctrl+C (non-Unix targets).
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    tracing::info!(signal = "CTRL_C", "Received termination signal");
    Ok("CTRL_C")
}
