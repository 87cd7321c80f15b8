//! JSONL file-backed activity log (persists across restarts).
//!
//! Each line is either a log entry or a mention attached to an earlier entry;
//! `list` folds mentions back onto their entries.

use async_trait::async_trait;
use chrono::Utc;
use record_types::{ActivityLog, ActivityLogError, LogEntry, LogListOptions, RecordId, UserId};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "line", rename_all = "snake_case")]
enum LogLine {
    Entry(LogEntry),
    Mention { entry_id: String, user: UserId },
}

pub struct JsonlActivityLog {
    path: std::path::PathBuf,
    append_lock: tokio::sync::Mutex<()>,
}

impl JsonlActivityLog {
    pub fn new(path: impl AsRef<std::path::Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            append_lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn append(&self, line: &LogLine) -> Result<(), ActivityLogError> {
        let _guard = self.append_lock.lock().await;
        let text =
            serde_json::to_string(line).map_err(|e| ActivityLogError::Other(e.to_string()))?;
        let mut f = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ActivityLogError::Other(e.to_string()))?;
        f.write_all(format!("{}\n", text).as_bytes())
            .await
            .map_err(|e| ActivityLogError::Other(e.to_string()))?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<LogEntry>, ActivityLogError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ActivityLogError::Other(e.to_string())),
        };
        let mut out: Vec<LogEntry> = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<LogLine>(line) {
                Ok(LogLine::Entry(entry)) => out.push(entry),
                Ok(LogLine::Mention { entry_id, user }) => {
                    if let Some(e) = out.iter_mut().find(|e| e.id == entry_id) {
                        if !e.mentions.contains(&user) {
                            e.mentions.push(user);
                        }
                    }
                }
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "skipping malformed log line"
                ),
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl ActivityLog for JsonlActivityLog {
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
        self.append(&LogLine::Entry(entry.clone())).await?;
        Ok(entry)
    }

    async fn attach_mention(
        &self,
        entry: &LogEntry,
        mention: UserId,
    ) -> Result<(), ActivityLogError> {
        if !self.read_all().await?.iter().any(|e| e.id == entry.id) {
            return Err(ActivityLogError::Other(format!(
                "log entry not found: {}",
                entry.id
            )));
        }
        self.append(&LogLine::Mention {
            entry_id: entry.id.clone(),
            user: mention,
        })
        .await
    }

    async fn list(&self, opts: &LogListOptions) -> Result<Vec<LogEntry>, ActivityLogError> {
        let mut out = self.read_all().await?;
        opts.apply(&mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_and_mentions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let log = JsonlActivityLog::new(&path);
        let entry = log.create("article", 3, UserId(1), "published").await.unwrap();
        log.attach_mention(&entry, UserId(4)).await.unwrap();
        drop(log);

        let reopened = JsonlActivityLog::new(&path);
        let entries = reopened
            .list(&LogListOptions::for_record("article", 3))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "published");
        assert_eq!(entries[0].mentions, vec![UserId(4)]);
    }

    #[tokio::test]
    async fn missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlActivityLog::new(dir.path().join("none.jsonl"));
        assert!(log.list(&LogListOptions::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mention_on_unknown_entry_fails_and_appends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let log = JsonlActivityLog::new(&path);
        let real = log.create("article", 1, UserId(1), "created").await.unwrap();
        let ghost = LogEntry {
            id: "missing".to_string(),
            ..real.clone()
        };

        assert!(log.attach_mention(&ghost, UserId(2)).await.is_err());
        let lines = std::fs::read_to_string(&path).unwrap().lines().count();
        assert_eq!(lines, 1);
    }

    #[tokio::test]
    async fn skips_malformed_lines() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not json\n").unwrap();
        let log = JsonlActivityLog::new(file.path());
        log.create("article", 2, UserId(1), "created").await.unwrap();

        let entries = log.list(&LogListOptions::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record_id, 2);
    }
}
