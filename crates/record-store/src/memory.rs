//! In-memory record store keyed by storage-assigned id.

use async_trait::async_trait;
use record_types::{Record, RecordBody, RecordFilter, RecordId, RecordStore, RecordStoreError};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Rows<B> {
    /// id -> record; ordered so lookups by nonce/id62 return the oldest match.
    records: BTreeMap<RecordId, Record<B>>,
    /// Last id handed out.
    last_id: RecordId,
}

/// In-memory implementation of RecordStore. Ids start at 1 and are never reused.
pub struct InMemoryRecordStore<B> {
    rows: Arc<RwLock<Rows<B>>>,
    _body: PhantomData<fn() -> B>,
}

impl<B: RecordBody> InMemoryRecordStore<B> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Rows {
                records: BTreeMap::new(),
                last_id: 0,
            })),
            _body: PhantomData,
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.rows.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn creator_taken(rows: &Rows<B>, record: &Record<B>) -> bool {
        rows.records
            .values()
            .any(|r| r.created_by == record.created_by && r.id != record.id)
    }
}

impl<B: RecordBody> Default for InMemoryRecordStore<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Clone for InMemoryRecordStore<B> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            _body: PhantomData,
        }
    }
}

#[async_trait]
impl<B: RecordBody> RecordStore for InMemoryRecordStore<B> {
    type Body = B;

    async fn write(&self, mut record: Record<B>) -> Result<Record<B>, RecordStoreError> {
        let mut guard = self.rows.write().await;
        if B::UNIQUE_CREATOR && Self::creator_taken(&guard, &record) {
            return Err(RecordStoreError::Conflict(format!(
                "{} already has a record created by user {}",
                B::RECORD_TYPE,
                record.created_by
            )));
        }
        let id = match record.id {
            Some(id) => id,
            None => guard
                .last_id
                .checked_add(1)
                .ok_or_else(|| RecordStoreError::Other("id space exhausted".to_string()))?,
        };
        guard.last_id = guard.last_id.max(id);
        record.id = Some(id);
        guard.records.insert(id, record.clone());
        Ok(record)
    }

    async fn find_one(&self, filter: &RecordFilter) -> Result<Option<Record<B>>, RecordStoreError> {
        let guard = self.rows.read().await;
        if let RecordFilter::Id(id) = filter {
            return Ok(guard.records.get(id).cloned());
        }
        Ok(guard.records.values().find(|r| filter.matches(r)).cloned())
    }

    async fn hard_delete(&self, record: &Record<B>) -> Result<bool, RecordStoreError> {
        let Some(id) = record.id else {
            return Ok(false);
        };
        let mut guard = self.rows.write().await;
        Ok(guard.records.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_types::UserId;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    impl RecordBody for Note {
        const RECORD_TYPE: &'static str = "note";
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        bio: String,
    }

    impl RecordBody for Profile {
        const RECORD_TYPE: &'static str = "profile";
        const UNIQUE_CREATOR: bool = true;
    }

    fn note(text: &str) -> Record<Note> {
        Record::new(
            UserId(1),
            Note {
                text: text.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn write_assigns_increasing_ids_and_updates_in_place() {
        let store = InMemoryRecordStore::new();
        let a = store.write(note("a")).await.unwrap();
        let b = store.write(note("b")).await.unwrap();
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));

        let mut a2 = a.clone();
        a2.body.text = "a2".to_string();
        let a2 = store.write(a2).await.unwrap();
        assert_eq!(a2.id, Some(1));
        assert_eq!(store.len().await, 2);

        let found = store.find_one(&RecordFilter::Id(1)).await.unwrap().unwrap();
        assert_eq!(found.body.text, "a2");
    }

    #[tokio::test]
    async fn find_by_nonce_and_id62() {
        let store = InMemoryRecordStore::new();
        let mut r = store.write(note("x").with_nonce("n-1")).await.unwrap();
        r.id62 = Some("1".to_string());
        store.write(r).await.unwrap();

        let by_nonce = store
            .find_one(&RecordFilter::Nonce("n-1".to_string()))
            .await
            .unwrap();
        assert_eq!(by_nonce.and_then(|r| r.id), Some(1));
        let by_id62 = store
            .find_one(&RecordFilter::Id62("1".to_string()))
            .await
            .unwrap();
        assert!(by_id62.is_some());
        let missing = store
            .find_one(&RecordFilter::Nonce("other".to_string()))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn hard_delete_removes_and_ids_are_not_reused() {
        let store = InMemoryRecordStore::new();
        let a = store.write(note("a")).await.unwrap();
        assert!(store.hard_delete(&a).await.unwrap());
        assert!(!store.hard_delete(&a).await.unwrap());
        assert!(!store.hard_delete(&note("unsaved")).await.unwrap());
        assert!(store.is_empty().await);

        let b = store.write(note("b")).await.unwrap();
        assert_eq!(b.id, Some(2));
    }

    #[tokio::test]
    async fn exhausted_id_space_is_an_error() {
        let store = InMemoryRecordStore::new();
        let mut last = note("last");
        last.id = Some(RecordId::MAX);
        store.write(last).await.unwrap();

        let err = store.write(note("next")).await.unwrap_err();
        assert!(matches!(err, RecordStoreError::Other(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unique_creator_rejects_second_record() {
        let store = InMemoryRecordStore::new();
        let first = store
            .write(Record::new(
                UserId(5),
                Profile {
                    bio: "one".to_string(),
                },
            ))
            .await
            .unwrap();
        // updating the same record is fine
        store.write(first.clone()).await.unwrap();

        let err = store
            .write(Record::new(
                UserId(5),
                Profile {
                    bio: "two".to_string(),
                },
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordStoreError::Conflict(_)));

        store
            .write(Record::new(
                UserId(6),
                Profile {
                    bio: "other".to_string(),
                },
            ))
            .await
            .unwrap();
    }
}
