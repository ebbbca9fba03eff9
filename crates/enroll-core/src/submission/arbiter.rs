//! First-wins arbitration between independent completion sources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

/// Accepts the first committed value and ignores every later one.
///
/// Each completion source holds a clone and calls [`commit`](Self::commit).
/// The winner's value is delivered to the receiver returned by
/// [`new`](Self::new); losers get `false` back and their values are dropped.
pub(crate) struct OutcomeArbiter<T> {
    inner: Arc<ArbiterInner<T>>,
}

struct ArbiterInner<T> {
    committed: AtomicBool,
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> OutcomeArbiter<T> {
    pub(crate) fn new() -> (Self, oneshot::Receiver<T>) {
        let (sender, receiver) = oneshot::channel();
        let arbiter = Self {
            inner: Arc::new(ArbiterInner {
                committed: AtomicBool::new(false),
                sender: Mutex::new(Some(sender)),
            }),
        };
        (arbiter, receiver)
    }

    /// Commit `value` as the outcome. Returns false if another source
    /// already committed.
    pub(crate) fn commit(&self, value: T) -> bool {
        if self.inner.committed.swap(true, Ordering::AcqRel) {
            return false;
        }
        let sender = self
            .inner
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sender) = sender {
            // The receiver may be gone if the caller stopped waiting.
            let _ = sender.send(value);
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn is_committed(&self) -> bool {
        self.inner.committed.load(Ordering::Acquire)
    }
}

impl<T> Clone for OutcomeArbiter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
