//! Shutdown coordination for the gateway.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

/// Broadcasts a single stop signal to the server and any background tasks.
///
/// Clones share the same channel. Only the first `trigger` is delivered.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. Returns `false` if shutdown was already under way.
    pub fn trigger(&self) -> bool {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return false;
        }
        let listeners = self.tx.send(()).unwrap_or(0);
        tracing::info!(listeners, "Shutdown triggered");
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Number of tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
