//! Graceful shutdown for the HTTP server.
//!
//! `Shutdown` is owned by whoever started the server (main, integration
//! tests). The server holds a [`ShutdownSignal`] and stops accepting once it
//! resolves.

use tokio::sync::broadcast;

/// Why the server was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// [`Shutdown::trigger`] was called.
    Triggered,
    /// The [`Shutdown`] was dropped.
    Dropped,
}

/// Owner side of the shutdown channel.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Signal handed to a server.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Ask every subscribed server to stop.
    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Shutdown triggered with no running server");
        }
    }

    /// Servers still listening for the signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Server side of the shutdown channel.
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered or the owner goes away.
    pub async fn recv(&mut self) -> ShutdownReason {
        match self.rx.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => ShutdownReason::Triggered,
            Err(broadcast::error::RecvError::Closed) => ShutdownReason::Dropped,
        }
    }
}
