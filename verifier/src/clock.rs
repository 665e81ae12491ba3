use std::future::Future;
use std::time::Duration;

/// Source of retry delays.
pub trait RetryClock: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real timer backed by `tokio::time`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

impl RetryClock for TokioClock {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

impl<T: RetryClock> RetryClock for std::sync::Arc<T> {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.as_ref().sleep(duration)
    }
}
