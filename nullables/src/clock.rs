//! Nullable clock: sleeps are recorded, never waited.

use pubrand_verifier::{CancellationToken, RetryClock};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A retry clock for tests.
///
/// Every requested sleep completes immediately and is recorded. Optionally
/// cancels a token once a given number of sleeps has been requested, to
/// simulate an operator aborting mid-way.
#[derive(Debug, Default)]
pub struct NullClock {
    sleeps: Mutex<Vec<Duration>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl NullClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel `token` when the `sleeps`-th sleep is requested.
    pub fn cancelling(token: CancellationToken, sleeps: usize) -> Self {
        Self {
            sleeps: Mutex::default(),
            cancel_after: Some((sleeps, token)),
        }
    }

    /// All requested sleeps, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Total simulated time spent sleeping.
    pub fn elapsed(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

impl RetryClock for NullClock {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        let count = {
            let mut sleeps = self.sleeps.lock().unwrap_or_else(PoisonError::into_inner);
            sleeps.push(duration);
            sleeps.len()
        };
        if let Some((after, token)) = &self.cancel_after {
            if count >= *after {
                token.cancel();
            }
        }
        std::future::ready(())
    }
}
