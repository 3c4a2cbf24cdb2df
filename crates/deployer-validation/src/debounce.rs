//! Per-key cancellable delayed tasks
//!
//! Each key owns at most one pending timer. Scheduling again for the same
//! key aborts the previous timer and starts a fresh quiet period; other keys
//! are unaffected.
//!
//! The action runs synchronously once the delay elapses, so an abort can
//! only ever land while the timer is still sleeping. Anything long-running
//! the action starts must be spawned by the action itself; rescheduling never
//! cancels it.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

/// Debounce timers keyed by `K`
#[derive(Debug)]
pub struct Debouncer<K>
where
    K: Eq + Hash,
{
    delay: Duration,
    pending: Arc<DashMap<K, (u64, AbortHandle)>>,
    generation: AtomicU64,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Create a debouncer with a fixed quiet period
    #[inline]
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Quiet period
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the timer for `key`
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: K, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let delay = self.delay;
        let pending = Arc::clone(&self.pending);
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            pending.remove_if(&task_key, |_, (g, _)| *g == generation);
            action();
        });

        if let Some((_, previous)) = self.pending.insert(key, (generation, handle.abort_handle())) {
            previous.abort();
        }
    }

    /// Cancel the timer for `key`; returns whether one was pending
    pub fn cancel(&self, key: &K) -> bool {
        match self.pending.remove(key) {
            Some((_, (_, handle))) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer
    pub fn cancel_all(&self) {
        self.pending.retain(|_, (_, handle)| {
            handle.abort();
            false
        });
    }

    /// Whether `key` has a timer running
    #[inline]
    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending
            .get(key)
            .is_some_and(|entry| !entry.value().1.is_finished())
    }

    /// Number of running timers
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending
            .iter()
            .filter(|entry| !entry.value().1.is_finished())
            .count()
    }
}

impl<K> Drop for Debouncer<K>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        for entry in self.pending.iter() {
            entry.value().1.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let fired = Arc::clone(&fired);
            debouncer.schedule("rg", move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(debouncer.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let fired = Arc::new(AtomicUsize::new(0));

        for key in ["location", "vmSize"] {
            let fired = Arc::clone(&fired);
            debouncer.schedule(key, move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Restarting one key leaves the other on schedule.
        let again = Arc::clone(&fired);
        debouncer.schedule("location", move || {
            again.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(debouncer.is_pending(&"location"));
        assert!(!debouncer.is_pending(&"vmSize"));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_stops_everything() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let fired = Arc::new(AtomicUsize::new(0));
        for key in ["a", "b"] {
            let fired = Arc::clone(&fired);
            debouncer.schedule(key, move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(debouncer.cancel(&"a"));
        assert!(!debouncer.cancel(&"a"));
        debouncer.cancel_all();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
