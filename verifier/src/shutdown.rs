//! Cancellation on process signals.
//!
//! A service embedding the verifier hands [`ShutdownController::token`] to
//! every [`crate::SubmissionVerifier`] it creates; on SIGINT/SIGTERM (or a
//! programmatic [`ShutdownController::shutdown`]) all in-flight
//! confirmations stop at their next query or sleep.

use tokio::signal;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is cancelled together with this controller.
    pub fn token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for SIGTERM or SIGINT, then trigger shutdown.
    pub async fn wait_for_signal(&self) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
            tokio::select! {
                r = signal::ctrl_c() => { r?; tracing::info!("received SIGINT, cancelling"); }
                _ = terminate.recv() => { tracing::info!("received SIGTERM, cancelling"); }
                _ = self.token.cancelled() => return Ok(()),
            }
        }
        #[cfg(not(unix))]
        {
            tokio::select! {
                r = signal::ctrl_c() => { r?; tracing::info!("received SIGINT, cancelling"); }
                _ = self.token.cancelled() => return Ok(()),
            }
        }
        self.shutdown();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_cancels_every_token() {
        let controller = ShutdownController::new();
        let a = controller.token();
        let b = controller.token();
        controller.shutdown();
        a.cancelled().await;
        assert!(b.is_cancelled());
        assert!(controller.is_shutdown());
    }

    #[tokio::test]
    async fn signal_wait_returns_after_programmatic_shutdown() {
        let controller = ShutdownController::new();
        controller.shutdown();
        controller.wait_for_signal().await.unwrap();
    }

    #[test]
    fn child_token_does_not_cancel_parent() {
        let controller = ShutdownController::new();
        controller.token().cancel();
        assert!(!controller.is_shutdown());
    }
}
