//! Trailing-edge debouncing of a changing value.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Publishes the latest input only after it has stayed unchanged for the
/// configured delay.
///
/// Every [`Debouncer::set`] cancels the pending timer and starts a new one,
/// so a burst of inputs produces a single trailing emission. Dropping the
/// debouncer cancels any pending timer. Must be used inside a tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    output: Arc<watch::Sender<T>>,
    latest: T,
    pending: Option<JoinHandle<()>>,
}

impl<T> Debouncer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (output, _) = watch::channel(initial.clone());
        Self {
            delay,
            output: Arc::new(output),
            latest: initial,
            pending: None,
        }
    }

    /// Feed a new input value.
    pub fn set(&mut self, value: T) {
        self.cancel();
        self.latest = value.clone();

        let output = Arc::clone(&self.output);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            output.send_replace(value);
        }));
    }

    /// Drop the pending emission, if any. The published value is unchanged.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Publish the latest input immediately.
    pub fn flush(&mut self) {
        self.cancel();
        self.output.send_replace(self.latest.clone());
    }

    /// Whether an emission is still scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Last published (settled) value.
    pub fn settled(&self) -> T {
        self.output.borrow().clone()
    }

    /// Last value passed to [`Debouncer::set`], settled or not.
    pub fn latest(&self) -> &T {
        &self.latest
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Receiver notified on every settled value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.output.subscribe()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_one_trailing_update() {
        let mut debouncer = Debouncer::new(String::new(), DELAY);
        let mut rx = debouncer.subscribe();

        for text in ["J", "Ja", "Jan", "Jane"] {
            debouncer.set(text.to_string());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(debouncer.settled(), "");
        assert!(!rx.has_changed().unwrap());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "Jane");

        tokio::time::sleep(DELAY * 4).await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_leading_edge_emission() {
        let mut debouncer = Debouncer::new(0u32, DELAY);
        debouncer.set(1);
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(debouncer.settled(), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(debouncer.settled(), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_stale_emission() {
        let mut debouncer = Debouncer::new(0u32, DELAY);
        let rx = debouncer.subscribe();
        debouncer.set(7);
        debouncer.cancel();

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(*rx.borrow(), 0);
        assert_eq!(*debouncer.latest(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_timer() {
        let mut debouncer = Debouncer::new(0u32, DELAY);
        let rx = debouncer.subscribe();
        debouncer.set(3);
        drop(debouncer);

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(*rx.borrow(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_publishes_immediately() {
        let mut debouncer = Debouncer::new(0u32, DELAY);
        debouncer.set(9);
        debouncer.flush();
        assert_eq!(debouncer.settled(), 9);
        assert!(!debouncer.is_pending());
    }
}
