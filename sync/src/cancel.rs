//! Cooperative cancellation for refresh tasks.
//!
//! Retry loops and timers check [`CancelSignal::is_cancelled`] at every
//! iteration boundary and `select!` on [`CancelSignal::cancelled`] while
//! sleeping. Fetches already awaiting a response are not aborted; their
//! continuations just stop scheduling further work.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

pub struct CancelSignal {
    cancelled: AtomicBool,
    tx: broadcast::Sender<()>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            cancelled: AtomicBool::new(false),
            tx,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Trigger cancellation. Returns `false` if it was already triggered.
    pub fn cancel(&self) -> bool {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        let _ = self.tx.send(());
        true
    }

    /// Resolve once cancellation has been triggered, including before this call.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if self.is_cancelled() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}
