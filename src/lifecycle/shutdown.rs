//! Signal handling for graceful shutdown
//!
//! Handlers are registered when the signal is created, so a signal that
//! arrives before anyone waits is still seen.

use tracing::debug;

/// Resolves on SIGTERM or SIGINT (Ctrl-C elsewhere)
pub struct ShutdownSignal {
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    /// Register the handlers; must be called inside a tokio runtime
    #[cfg(unix)]
    pub fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    #[cfg(not(unix))]
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next shutdown signal
    #[cfg(unix)]
    pub async fn wait(&mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => debug!("received SIGTERM"),
            _ = self.sigint.recv() => debug!("received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    pub async fn wait(&mut self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => debug!("received Ctrl-C"),
            Err(e) => {
                tracing::warn!(?e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        }
    }
}
