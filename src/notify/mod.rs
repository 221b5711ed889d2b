// Reminder delivery
//
// The model regenerates the feed on every poll; a notification is delivered
// once its send time has passed and its id has not been recorded as sent.

mod outbox;
mod poller;

pub use outbox::OutboxNotifier;
pub use poller::NotificationPoller;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::model::Notification;

/// Somewhere a due notification can be sent
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<()>;

    fn name(&self) -> &str;
}

/// Stable id used to avoid delivering the same reminder twice
pub fn notification_id(notification: &Notification) -> String {
    notification.id()
}

/// Notifications whose send time is at or before `now` and that `was_sent`
/// has not seen. Entries with an unparseable `send_at` are skipped.
pub fn due_notifications<'a, F>(
    feed: &'a [Notification],
    now: NaiveDateTime,
    was_sent: F,
) -> Vec<&'a Notification>
where
    F: Fn(&str) -> bool,
{
    let mut seen = std::collections::HashSet::new();
    feed.iter()
        .filter(|n| match n.send_at_parsed() {
            Some(at) => at <= now,
            None => {
                tracing::debug!(send_at = %n.send_at, "Skipping notification with unparseable send time");
                false
            }
        })
        .filter(|n| {
            let id = notification_id(n);
            !was_sent(&id) && seen.insert(id)
        })
        .collect()
}
