//! Refresh triggers for views.
//!
//! A view reloads its data when told to, and there are three independent
//! ways to tell it:
//!
//! - [`ChangeSubscription`]: a callback on the store's change bus, run in the
//!   same context as the mutation.
//! - [`ChangeWatcher`]: a task reading the bus's broadcast channel, for
//!   views living in another task or sharing the bus from another handle.
//! - [`Poller`]: a fixed interval timer, for views that refresh regardless
//!   of signals.
//!
//! All three unregister themselves when dropped.

use std::time::Duration;

use gigboard_store::{ChangeBus, DataChanged, SubscriptionId};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Bus callback that is removed when this value is dropped.
pub struct ChangeSubscription {
    bus: ChangeBus,
    id: SubscriptionId,
}

impl ChangeSubscription {
    pub fn new<F>(bus: &ChangeBus, callback: F) -> Self
    where
        F: Fn(DataChanged) + Send + Sync + 'static,
    {
        let id = bus.on_change(callback);
        Self {
            bus: bus.clone(),
            id,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

/// Task running `reload` for every signal received on the bus channel.
///
/// A lagging receiver reloads once and carries on, since a single re-read
/// covers any number of missed signals.
pub struct ChangeWatcher {
    task: JoinHandle<()>,
}

impl ChangeWatcher {
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(bus: &ChangeBus, reload: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let mut rx = bus.watch();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(_) => reload(),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "change watcher lagged");
                        reload();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Self { task }
    }

    pub fn stop(self) {}
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Interval timer running `reload` every `period`.
pub struct Poller {
    task: JoinHandle<()>,
    period: Duration,
}

impl Poller {
    /// Must be called from within a Tokio runtime. The first reload happens
    /// one `period` after the call.
    pub fn spawn<F>(period: Duration, reload: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                reload();
            }
        });
        tracing::debug!(period_ms = period.as_millis() as u64, "poller started");
        Self { task, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {}
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + Clone + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn subscription_unsubscribes_on_drop() {
        let bus = ChangeBus::new();
        let (count, bump) = counter();

        let subscription = ChangeSubscription::new(&bus, move |_| bump());
        assert_eq!(bus.listener_count(), 1);
        bus.notify();

        drop(subscription);
        assert_eq!(bus.listener_count(), 0);
        bus.notify();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn watcher_reloads_on_broadcast() {
        let bus = ChangeBus::new();
        let (count, bump) = counter();
        let watcher = ChangeWatcher::spawn(&bus, bump);

        bus.notify();
        bus.notify();

        for _ in 0..50 {
            if count.load(Ordering::SeqCst) == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 2);
        watcher.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn poller_ticks_until_stopped() {
        let (count, bump) = counter();
        let poller = Poller::spawn(Duration::from_millis(100), bump);
        assert_eq!(poller.period(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(350)).await;
        let ticks = count.load(Ordering::SeqCst);
        assert_eq!(ticks, 3);

        poller.stop();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_and_subscription_are_independent() {
        let bus = ChangeBus::new();
        let (count, bump) = counter();
        let signal_bump = bump.clone();

        let subscription = ChangeSubscription::new(&bus, move |_| signal_bump());
        let poller = Poller::spawn(Duration::from_millis(100), bump);

        drop(subscription);
        bus.notify();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(poller.is_running());
    }
}
