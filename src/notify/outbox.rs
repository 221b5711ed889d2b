// Outbox notifier: appends delivered reminders to outbox.jsonl

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{notification_id, Notifier};
use crate::config::constants::OUTBOX_FILE;
use crate::model::Notification;

#[derive(Serialize)]
struct OutboxEntry<'a> {
    ts: String,
    id: String,
    #[serde(flatten)]
    notification: &'a Notification,
}

pub struct OutboxNotifier {
    path: PathBuf,
}

impl OutboxNotifier {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(OUTBOX_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open outbox: {}", self.path.display()))?;
        writeln!(file, "{}", line).context("Failed to write outbox entry")
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        let entry = OutboxEntry {
            ts: Utc::now().to_rfc3339(),
            id: notification_id(notification),
            notification,
        };
        let json = serde_json::to_string(&entry).context("Failed to serialize notification")?;
        self.append(&json)?;

        tracing::info!(
            urgency = %notification.urgency,
            kind = %notification.kind,
            "🔔 {}",
            notification.message
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "outbox"
    }
}
