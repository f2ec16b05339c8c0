//! Trailing-edge debounce.
//!
//! [`Debouncer::call`] schedules an action to run once the caller has been
//! quiet for the configured delay.  A newer call cancels a pending one while
//! it is still waiting.  Once the delay has elapsed the action runs to
//! completion even if another call arrives.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Default quiet period for search input.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `action`, replacing any action still waiting.
    pub fn call<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            action.await;
        });
    }

    /// Drop the waiting action, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn only_last_call_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        for text in ["b", "ba", "bat"] {
            let tx = tx.clone();
            debouncer.call(async move {
                tx.send(text).unwrap();
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(rx.recv().await, Some("bat"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_full_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.call(async move {
            tx.send(()).unwrap();
        });

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await, Some(()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_action() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut debouncer = Debouncer::default();
        debouncer.call(async move {
            tx.send(()).unwrap();
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_calls_each_fire() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(50));

        for n in 0..3 {
            let tx = tx.clone();
            debouncer.call(async move {
                tx.send(n).unwrap();
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut fired = Vec::new();
        while let Ok(n) = rx.try_recv() {
            fired.push(n);
        }
        assert_eq!(fired, vec![0, 1, 2]);
    }
}
