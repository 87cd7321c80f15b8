//! Collaborator traits and their error types.

use crate::{
    LogEntry, LogListOptions, Moment, Record, RecordBody, RecordFilter, RecordId, SiteId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistent storage for one record type.
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Body: RecordBody;

    /// Insert or update. Assigns `id` on first write; every other field is
    /// stored as given. Returns the stored record.
    async fn write(
        &self,
        record: Record<Self::Body>,
    ) -> Result<Record<Self::Body>, RecordStoreError>;

    async fn find_one(
        &self,
        filter: &RecordFilter,
    ) -> Result<Option<Record<Self::Body>>, RecordStoreError>;

    /// Remove the record from storage. Returns whether a row was removed.
    async fn hard_delete(&self, record: &Record<Self::Body>) -> Result<bool, RecordStoreError>;
}

/// Current-time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Integer epoch mirror for a timestamp (seconds).
    fn epoch(&self, at: DateTime<Utc>) -> i64 {
        at.timestamp()
    }

    fn moment(&self) -> Moment {
        let at = self.now();
        Moment {
            at,
            timestamp: self.epoch(at),
        }
    }
}

/// Maps a primary key to a short textual identifier. Must be deterministic.
pub trait IdentifierEncoder: Send + Sync {
    fn encode(&self, id: RecordId) -> Result<String, EncoderError>;
}

/// Append-only activity log keyed by record type and id.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn create(
        &self,
        record_type: &str,
        record_id: RecordId,
        actor: UserId,
        message: &str,
    ) -> Result<LogEntry, ActivityLogError>;

    async fn attach_mention(
        &self,
        entry: &LogEntry,
        mention: UserId,
    ) -> Result<(), ActivityLogError>;

    async fn list(&self, opts: &LogListOptions) -> Result<Vec<LogEntry>, ActivityLogError>;
}

/// Site/tenant a new record belongs to.
pub trait SiteContext: Send + Sync {
    fn current(&self) -> Result<SiteId, SiteContextError>;
}

/// Human-readable relative time ("5 minutes ago", "in 2 hours").
pub trait RelativeTime: Send + Sync {
    fn format(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("record store error: {0}")]
    Other(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ActivityLogError {
    #[error("activity log error: {0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    #[error("cannot encode negative id: {0}")]
    Negative(RecordId),
    #[error("encoder error: {0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SiteContextError {
    #[error("no current site: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("record has not been persisted")]
    NotPersisted,
    #[error("store: {0}")]
    Store(#[from] RecordStoreError),
    #[error("activity log: {0}")]
    Log(#[from] ActivityLogError),
    #[error("encoder: {0}")]
    Encoder(#[from] EncoderError),
    #[error("site: {0}")]
    Site(#[from] SiteContextError),
}
