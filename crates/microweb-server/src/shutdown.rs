//! Graceful shutdown and connection accounting.
//!
//! [`ShutdownSignal`] is a cloneable latch backed by a `watch` channel.
//! [`ConnectionLimiter`] caps concurrent connections with a semaphore and
//! lets shutdown wait until every permit has come back.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};

/// A latch that tasks can trigger and await.
///
/// ```rust
/// use microweb_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let observer = shutdown.clone();
/// shutdown.trigger();
/// assert!(observer.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Creates a signal triggered by SIGINT or SIGTERM.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            wait_for_os_signal().await;
            trigger.trigger();
        });
        signal
    }

    /// Triggers shutdown. Idempotent.
    pub fn trigger(&self) {
        if !self.sender.send_replace(true) {
            tracing::debug!("shutdown triggered");
        }
    }

    /// Returns true once shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Completes when shutdown is triggered, immediately if it already was.
    pub async fn recv(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this only errors if it is gone.
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("received SIGTERM, shutting down");
                    }
                    result = tokio::signal::ctrl_c() => {
                        log_ctrl_c(result);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM, waiting for SIGINT only");
                log_ctrl_c(tokio::signal::ctrl_c().await);
            }
        }
    }

    #[cfg(not(unix))]
    {
        log_ctrl_c(tokio::signal::ctrl_c().await);
    }
}

fn log_ctrl_c(result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::info!("received SIGINT, shutting down"),
        Err(e) => tracing::error!(error = %e, "failed to listen for SIGINT, shutting down"),
    }
}

/// Caps concurrent connections and tracks them for draining.
#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    permits: Arc<Semaphore>,
    capacity: u32,
}

impl ConnectionLimiter {
    /// Creates a limiter admitting at most `max` connections.
    #[must_use]
    pub fn new(max: usize) -> Self {
        let capacity = u32::try_from(max.max(1)).unwrap_or(u32::MAX);
        Self {
            permits: Arc::new(Semaphore::new(capacity as usize)),
            capacity,
        }
    }

    /// Admits a connection, or returns `None` when the limit is reached.
    ///
    /// The connection counts as open until the permit is dropped.
    #[must_use]
    pub fn try_admit(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).try_acquire_owned().ok()
    }

    /// Number of connections currently open.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.capacity as usize - self.permits.available_permits()
    }

    /// Waits up to `timeout` for every connection to close.
    ///
    /// Returns false if connections were still open at the deadline.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let all = self.permits.acquire_many(self.capacity);
        matches!(tokio::time::timeout(timeout, all).await, Ok(Ok(_)))
    }
}
