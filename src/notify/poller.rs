// Background notification poller

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{due_notifications, notification_id, Notifier};
use crate::agent::CourseSyncAgent;
use crate::state::{SharedState, StateStore, MIN_POLL_SECONDS};

pub struct NotificationPoller {
    agent: Arc<CourseSyncAgent>,
    store: StateStore,
    state: SharedState,
    notifier: Arc<dyn Notifier>,
}

impl NotificationPoller {
    pub fn new(
        agent: Arc<CourseSyncAgent>,
        store: StateStore,
        state: SharedState,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            agent,
            store,
            state,
            notifier,
        }
    }

    /// Regenerate the feed and deliver whatever is due at `now`.
    ///
    /// Returns the number of notifications delivered.
    pub async fn tick(&self, now: NaiveDateTime) -> Result<usize> {
        let (assignments, settings) = {
            let state = self.state.read().await;
            (state.open_assignments(), state.settings.clone())
        };
        if assignments.is_empty() {
            return Ok(0);
        }

        let schedule = self
            .agent
            .create_schedule(&assignments, settings.hours_per_day)
            .await?;
        let feed = self
            .agent
            .generate_notifications(
                schedule.as_ref(),
                &assignments,
                settings.notification_lead_days,
            )
            .await?;

        let due: Vec<_> = {
            let state = self.state.read().await;
            due_notifications(&feed, now, |id| state.was_sent(id))
                .into_iter()
                .cloned()
                .collect()
        };
        if due.is_empty() {
            tracing::debug!(feed = feed.len(), "No notifications due");
            return Ok(0);
        }

        let mut delivered = Vec::new();
        for notification in &due {
            match self.notifier.deliver(notification).await {
                Ok(()) => delivered.push(notification_id(notification)),
                Err(e) => tracing::warn!(
                    notifier = self.notifier.name(),
                    "Failed to deliver notification: {:#}",
                    e
                ),
            }
        }

        if !delivered.is_empty() {
            let mut state = self.state.write().await;
            for id in &delivered {
                state.mark_sent(id.clone());
            }
            self.store
                .persist(state)
                .await
                .context("Failed to persist sent notifications")?;
        }

        tracing::info!(delivered = delivered.len(), due = due.len(), "Notification tick");
        Ok(delivered.len())
    }

    /// Run until `cancel` fires. Ticks only while notifications are enabled;
    /// a failed tick is logged and the loop keeps going.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(notifier = self.notifier.name(), "Notification poller started");
            loop {
                let poll_seconds = self.state.read().await.settings.notification_poll_seconds;

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs(poll_seconds.max(MIN_POLL_SECONDS))) => {}
                }

                if !self.state.read().await.settings.notifications_enabled {
                    continue;
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    result = self.tick(Local::now().naive_local()) => {
                        if let Err(e) = result {
                            tracing::warn!("Notification tick failed: {:#}", e);
                        }
                    }
                }
            }
            tracing::info!("Notification poller stopped");
        })
    }
}
