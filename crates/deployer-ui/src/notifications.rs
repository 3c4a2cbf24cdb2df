//! Transient notification center
//!
//! Notifications are kept in arrival order. Non-sticky ones are removed by a
//! tokio timer after the configured TTL; sticky ones stay until dismissed.

use deployer_validation::{Notification, NotificationId, Notifier};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Default time a transient notification stays visible
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

type Active = Arc<Mutex<IndexMap<NotificationId, Notification>>>;

/// Visible notifications with TTL-based auto-dismiss
///
/// Clones share the same set of notifications.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    active: Active,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl NotificationCenter {
    /// Center whose transient notifications last `ttl`
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            active: Arc::new(Mutex::new(IndexMap::new())),
            ttl,
        }
    }

    /// Auto-dismiss delay
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Visible notifications, oldest first
    #[must_use]
    pub fn active(&self) -> Vec<(NotificationId, Notification)> {
        self.active
            .lock()
            .iter()
            .map(|(id, n)| (*id, n.clone()))
            .collect()
    }

    /// Look up one notification
    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.active.lock().get(&id).cloned()
    }

    /// Number of visible notifications
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.lock().len()
    }

    /// True when nothing is shown
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.lock().is_empty()
    }

    /// Dismiss everything, sticky notifications included
    pub fn clear(&self) {
        self.active.lock().clear();
    }

    fn schedule_dismiss(&self, id: NotificationId) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(%id, "No runtime; notification will stay until dismissed");
            return;
        };
        let active = Arc::downgrade(&self.active);
        let ttl = self.ttl;
        runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(active) = active.upgrade() {
                if active.lock().shift_remove(&id).is_some() {
                    tracing::trace!(%id, "Notification expired");
                }
            }
        });
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, notification: Notification) -> NotificationId {
        let id = NotificationId::new();
        let sticky = notification.sticky;
        tracing::debug!(%id, level = ?notification.level, message = %notification.message, "Notification");
        self.active.lock().insert(id, notification);
        if !sticky {
            self.schedule_dismiss(id);
        }
        id
    }

    fn dismiss(&self, id: NotificationId) {
        self.active.lock().shift_remove(&id);
    }
}
