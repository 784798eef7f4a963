//! Cooperative cancellation token
//!
//! Delivered to a run when it is superseded in its concurrency group (or
//! cancelled externally). The job runner polls it between steps; the step
//! executor additionally awaits it so an in-flight command can be killed.

use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable cancellation flag shared between a run and the controller
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Check the flag without waiting
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once cancellation has been requested
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // wait_for returns immediately when the flag is already set; the
        // sender cannot be dropped while `self` borrows it
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
