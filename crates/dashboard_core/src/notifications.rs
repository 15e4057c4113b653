//! Transient alerts shown at the top of the page.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::domain::{NotificationId, Severity};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::debug;

use crate::format;

pub const NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn icon(&self) -> &'static str {
        self.severity.icon()
    }

    /// Creation date as `dd/mm/yyyy`.
    pub fn date_label(&self) -> String {
        format::date_vi(self.created_at.date_naive())
    }
}

struct Entry {
    notification: Notification,
    expiry: JoinHandle<()>,
}

#[derive(Default)]
struct NotificationList {
    entries: VecDeque<Entry>,
}

impl NotificationList {
    fn remove(&mut self, id: NotificationId) -> Option<Entry> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.notification.id == id)?;
        self.entries.remove(index)
    }
}

/// Newest-first list of visible notifications, each removed automatically
/// once its TTL passes.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Mutex<NotificationList>>,
    next_id: Arc<AtomicU64>,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(NotificationList::default())),
            next_id: Arc::new(AtomicU64::new(1)),
            ttl,
        }
    }

    pub async fn notify(&self, severity: Severity, message: impl Into<String>) -> NotificationId {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let notification = Notification {
            id,
            severity,
            message: message.into(),
            created_at: Utc::now(),
        };

        let mut guard = self.inner.lock().await;
        let inner = Arc::clone(&self.inner);
        let ttl = self.ttl;
        let expiry = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if inner.lock().await.remove(id).is_some() {
                debug!(notification = id.0, "notification expired");
            }
        });
        guard.entries.push_front(Entry {
            notification,
            expiry,
        });
        id
    }

    /// Removes the notification now and cancels its expiry. Dismissing one
    /// that is already gone is a no-op returning `false`.
    pub async fn dismiss(&self, id: NotificationId) -> bool {
        let removed = self.inner.lock().await.remove(id);
        match removed {
            Some(entry) => {
                entry.expiry.abort();
                true
            }
            None => false,
        }
    }

    pub async fn active(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .await
            .entries
            .iter()
            .map(|entry| entry.notification.clone())
            .collect()
    }

    pub async fn clear(&self) {
        let mut guard = self.inner.lock().await;
        for entry in guard.entries.drain(..) {
            entry.expiry.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/notifications_tests.rs"]
mod tests;
