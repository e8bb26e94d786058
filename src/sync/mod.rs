//! Cross-thread hand-off primitives
//!
//! Each receiver thread publishes into its own single-writer channel; the
//! frame loop drains pending values without ever blocking and keeps only
//! the newest one. There is no shared mutable state between a receiver and
//! the consumer, so torn reads are impossible by construction.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Create a latest-value hand-off pair.
///
/// The sender side lives on a receiver thread, the poller side on the
/// frame loop. Values published between two polls collapse to the newest.
pub fn latest_channel<T>() -> (LatestSender<T>, LatestReceiver<T>) {
    let (tx, rx) = unbounded();
    (LatestSender { tx }, LatestReceiver { rx })
}

/// Writing half of a latest-value cell. One writer per cell.
pub struct LatestSender<T> {
    tx: Sender<T>,
}

impl<T> LatestSender<T> {
    /// Publish a new value. Never blocks; a disconnected poller is ignored
    /// because the publishing thread is about to be shut down anyway.
    pub fn publish(&self, value: T) {
        let _ = self.tx.send(value);
    }
}

/// Reading half of a latest-value cell.
pub struct LatestReceiver<T> {
    rx: Receiver<T>,
}

impl<T> LatestReceiver<T> {
    /// Drain everything published since the last poll and return the most
    /// recent value, or `None` when nothing new arrived. Never blocks.
    pub fn poll(&self) -> Option<T> {
        let mut latest = None;
        while let Ok(value) = self.rx.try_recv() {
            latest = Some(value);
        }
        latest
    }
}

/// Process-wide cooperative cancellation flag shared by all receiver loops.
#[derive(Clone, Debug)]
pub struct RunFlag {
    inner: Arc<AtomicBool>,
}

impl RunFlag {
    /// New flag in the running state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }

    /// Request shutdown. Receiver loops observe this after their next
    /// blocking call returns.
    pub fn stop(&self) {
        self.inner.store(false, Ordering::Relaxed);
    }
}
