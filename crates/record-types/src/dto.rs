//! Value objects exchanged with collaborators: filters, time info, log entries.

use crate::{Record, RecordBody, RecordId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single-record lookup key for [`crate::RecordStore::find_one`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFilter {
    Id(RecordId),
    Id62(String),
    Nonce(String),
}

impl RecordFilter {
    pub fn matches<B: RecordBody>(&self, record: &Record<B>) -> bool {
        match self {
            RecordFilter::Id(id) => record.id == Some(*id),
            RecordFilter::Id62(id62) => record.id62.as_deref() == Some(id62.as_str()),
            RecordFilter::Nonce(nonce) => record.nonce.as_deref() == Some(nonce.as_str()),
        }
    }
}

/// Absolute time, epoch mirror, and relative-time text for one stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInfo {
    pub utc: DateTime<Utc>,
    pub timestamp: i64,
    pub timeago: String,
}

/// One activity-log entry attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub record_type: String,
    pub record_id: RecordId,
    pub logged_by: UserId,
    pub message: String,
    #[serde(default)]
    pub mentions: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Options for listing log entries (filter + pagination). Newest first.
#[derive(Debug, Clone, Default)]
pub struct LogListOptions {
    pub record_type: Option<String>,
    pub record_id: Option<RecordId>,
    pub logged_by: Option<UserId>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl LogListOptions {
    pub fn for_record(record_type: &str, record_id: RecordId) -> Self {
        Self {
            record_type: Some(record_type.to_string()),
            record_id: Some(record_id),
            ..Self::default()
        }
    }

    /// Filter, order newest first, and paginate `entries` in place.
    pub fn apply(&self, entries: &mut Vec<LogEntry>) {
        if let Some(ref t) = self.record_type {
            entries.retain(|e| &e.record_type == t);
        }
        if let Some(id) = self.record_id {
            entries.retain(|e| e.record_id == id);
        }
        if let Some(user) = self.logged_by {
            entries.retain(|e| e.logged_by == user);
        }
        entries.reverse();
        let offset = self.offset.unwrap_or(0) as usize;
        let limit = self.limit.unwrap_or(100) as usize;
        let taken: Vec<LogEntry> = std::mem::take(entries)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();
        *entries = taken;
    }
}
