//! In-memory activity log (process lifetime only).

use async_trait::async_trait;
use chrono::Utc;
use record_types::{ActivityLog, ActivityLogError, LogEntry, LogListOptions, RecordId, UserId};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory implementation of ActivityLog. Entries are kept in insertion order.
pub struct InMemoryActivityLog {
    entries: RwLock<Vec<LogEntry>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn create(
        &self,
        record_type: &str,
        record_id: RecordId,
        actor: UserId,
        message: &str,
    ) -> Result<LogEntry, ActivityLogError> {
        let entry = LogEntry {
            id: Uuid::new_v4().to_string(),
            record_type: record_type.to_string(),
            record_id,
            logged_by: actor,
            message: message.to_string(),
            mentions: Vec::new(),
            created_at: Utc::now(),
        };
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn attach_mention(
        &self,
        entry: &LogEntry,
        mention: UserId,
    ) -> Result<(), ActivityLogError> {
        let mut guard = self.entries.write().await;
        let stored = guard
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| {
                ActivityLogError::Other(format!("log entry not found: {}", entry.id))
            })?;
        if !stored.mentions.contains(&mention) {
            stored.mentions.push(mention);
        }
        Ok(())
    }

    async fn list(&self, opts: &LogListOptions) -> Result<Vec<LogEntry>, ActivityLogError> {
        let mut out: Vec<LogEntry> = self.entries.read().await.clone();
        opts.apply(&mut out);
        Ok(out)
    }
}
