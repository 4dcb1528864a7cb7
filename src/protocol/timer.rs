use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A one-shot timer backed by a spawned Tokio task.
///
/// Dropping a `Timer` detaches it; only [`Timer::cancel`] stops it. That lets
/// a firing task take its own handle out of shared state without aborting
/// itself.
#[derive(Debug)]
pub struct Timer {
    task: JoinHandle<()>,
}

impl Timer {
    /// Run `on_fire` once `delay` has elapsed
    pub fn start<F, Fut>(delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire().await;
        });
        Self { task }
    }

    /// Stop the timer if it has not fired yet
    pub fn cancel(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_timer_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let timer = Timer::start(Duration::from_millis(10), move || async move {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.is_finished());
    }

    #[tokio::test]
    async fn test_timer_cancellation() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let timer = Timer::start(Duration::from_millis(30), move || async move {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(5)).await;
        timer.cancel();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dropped_timer_still_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        drop(Timer::start(Duration::from_millis(10), move || async move {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
