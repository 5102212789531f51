//! Cooperative shutdown for the sampling loop.
//!
//! A `ShutdownToken` is shared between the signal handler and the sampler.
//! Signaling wakes an in-progress inter-tick wait immediately, so the
//! process exits without sleeping out the rest of the interval.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Shared shutdown flag with a wakeup channel. Clones observe the same flag.
#[derive(Clone, Default)]
pub struct ShutdownToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    signaled: Mutex<bool>,
    wake: Condvar,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown and wakes every waiter.
    pub fn signal(&self) {
        let mut signaled = self.inner.signaled.lock().unwrap();
        *signaled = true;
        self.inner.wake.notify_all();
    }

    /// True once [`signal`](Self::signal) has been called.
    pub fn is_signaled(&self) -> bool {
        *self.inner.signaled.lock().unwrap()
    }

    /// Blocks for `timeout` or until signaled, whichever comes first.
    /// Returns true when shutdown was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let signaled = self.inner.signaled.lock().unwrap();
        if *signaled {
            return true;
        }
        let (signaled, _) = self
            .inner
            .wake
            .wait_timeout_while(signaled, timeout, |signaled| !*signaled)
            .unwrap();
        *signaled
    }
}
