//! Debounced value propagation.
//!
//! A [`Debouncer`] delays publishing a rapidly-changing value until it has
//! stopped changing for a fixed interval. Every `set` aborts the previous
//! timer task outright (cancelled, not merely ignored), so a stale value
//! can never be published over a newer one. `set_immediate` bypasses the
//! timer; the search coordinator uses it when the search box is cleared so
//! clearing never feels delayed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct Debouncer<T: Clone + Send + Sync + 'static> {
    delay: Duration,
    sender: Arc<watch::Sender<T>>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Clone + Send + Sync + 'static> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self {
            delay,
            sender: Arc::new(sender),
            pending: None,
        }
    }

    /// Watch the debounced output.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// The most recently published (settled) value.
    pub fn current(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Restart the timer with a new value; publishes after the delay
    /// unless superseded first.
    pub fn set(&mut self, value: T) {
        self.cancel_pending();
        let sender = Arc::clone(&self.sender);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sender.send_replace(value);
        }));
    }

    /// Publish synchronously, cancelling any pending timer.
    pub fn set_immediate(&mut self, value: T) {
        self.cancel_pending();
        self.sender.send_replace(value);
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, advance};

    const DELAY: Duration = Duration::from_millis(400);

    #[tokio::test(start_paused = true)]
    async fn publishes_after_the_delay() {
        let mut debouncer = Debouncer::new(String::new(), DELAY);
        let mut rx = debouncer.subscribe();

        let started = Instant::now();
        debouncer.set("ace".to_string());
        rx.changed().await.unwrap();

        assert_eq!(*rx.borrow(), "ace");
        assert_eq!(started.elapsed(), DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_changes_publish_only_the_final_value() {
        let mut debouncer = Debouncer::new(String::new(), DELAY);
        let mut rx = debouncer.subscribe();

        debouncer.set("a".to_string());
        advance(Duration::from_millis(50)).await;
        debouncer.set("ac".to_string());
        advance(Duration::from_millis(50)).await;
        debouncer.set("ace".to_string());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), "ace");

        // Nothing further is pending: the earlier timers were aborted.
        advance(DELAY * 2).await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_bypasses_the_timer() {
        let mut debouncer = Debouncer::new("ace".to_string(), DELAY);
        let rx = debouncer.subscribe();

        debouncer.set("aceplayer".to_string());
        // Cleared before the timer fires: published with zero latency and
        // the pending "aceplayer" emission is cancelled.
        debouncer.set_immediate(String::new());

        assert_eq!(*rx.borrow(), "");
        advance(DELAY * 2).await;
        assert_eq!(*rx.borrow(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn retrigger_restarts_the_clock() {
        let mut debouncer = Debouncer::new(String::new(), DELAY);
        let mut rx = debouncer.subscribe();

        debouncer.set("a".to_string());
        advance(DELAY - Duration::from_millis(1)).await;
        assert!(!rx.has_changed().unwrap());

        debouncer.set("ab".to_string());
        let started = Instant::now();
        rx.changed().await.unwrap();

        assert_eq!(started.elapsed(), DELAY);
        assert_eq!(*rx.borrow(), "ab");
    }
}
