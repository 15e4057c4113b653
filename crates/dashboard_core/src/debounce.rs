//! Collapses bursts of calls into a single delayed invocation.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use futures::future::{BoxFuture, FutureExt};
use tokio::task::JoinHandle;

type Action<A> = Arc<dyn Fn(A) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wraps an async action so that only the last of a rapid series of calls
/// reaches it, `wait` after the series goes quiet.
///
/// Each wrapper owns at most one pending timer. Re-arming, [`cancel`], and
/// dropping the wrapper all abort it. Once the timer has fired the action runs
/// as its own task and is never cancelled by a later call.
///
/// [`cancel`]: Debouncer::cancel
pub struct Debouncer<A> {
    wait: Duration,
    action: Action<A>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F, Fut>(wait: Duration, action: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            wait,
            action: Arc::new(move |args| action(args).boxed()),
            pending: Mutex::new(None),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn call(&self, args: A) {
        let action = Arc::clone(&self.action);
        let wait = self.wait;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            tokio::spawn(action(args));
        });

        if let Some(previous) = self.lock_pending().replace(timer) {
            previous.abort();
        }
    }

    /// Drops the pending invocation, if any. Returns whether one was waiting.
    pub fn cancel(&self) -> bool {
        match self.lock_pending().take() {
            Some(timer) => {
                let was_waiting = !timer.is_finished();
                timer.abort();
                was_waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
