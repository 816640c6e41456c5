use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    count: Mutex<usize>,
    idle: Condvar,
    notify: Notify,
}

/// Counts outstanding dispatches and lets callers wait for the count to hit zero.
///
/// Blocking waiters park on a condvar, async waiters on a [`Notify`].
#[derive(Debug, Default, Clone)]
pub(crate) struct WaitGroup {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub(crate) fn add(&self) -> GroupGuard {
        *self.inner.count.lock() += 1;
        GroupGuard(Arc::clone(&self.inner))
    }

    pub(crate) fn count(&self) -> usize {
        *self.inner.count.lock()
    }

    pub(crate) fn wait(&self) {
        let mut count = self.inner.count.lock();
        while *count > 0 {
            self.inner.idle.wait(&mut count);
        }
    }

    pub(crate) async fn wait_async(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.count() == 0 {
                break;
            }
            notified.await;
        }
    }
}

/// Decrements the owning [`WaitGroup`] when dropped, including during unwinding.
#[derive(Debug)]
pub(crate) struct GroupGuard(Arc<Inner>);

impl Drop for GroupGuard {
    fn drop(&mut self) {
        let mut count = self.0.count.lock();
        *count -= 1;
        if *count == 0 {
            self.0.idle.notify_all();
            self.0.notify.notify_waiters();
        }
    }
}
