use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Cancellable one-shot timer; dropping it cancels the pending callback.
///
/// The callback receives a token that is cancelled once the timer has been
/// replaced, so it can detect that it lost a race after taking a lock.
#[derive(Debug)]
pub(crate) struct DebounceTimer {
    token: CancellationToken,
}

impl DebounceTimer {
    pub(crate) fn start<F, Fut>(delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let guard = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = waiter.cancelled() => {}
                () = tokio::time::sleep(delay) => on_fire(guard).await,
            }
        });
        Self { token }
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
