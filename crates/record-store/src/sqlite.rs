//! SQLite-backed record store: one table per record type, flat lifecycle columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use record_types::{
    AxisState, Moment, Record, RecordBody, RecordFilter, RecordStore, RecordStoreError, SiteId,
    Stamp, UserId,
};
use std::marker::PhantomData;
use std::path::Path;

const COLUMNS: &str = "id, id62, nonce, site_id, \
    created_at, created_at_timestamp, created_by, \
    updated_at, updated_at_timestamp, \
    published_at, published_at_timestamp, published_by, \
    unpublished_at, unpublished_at_timestamp, unpublished_by, \
    approved_at, approved_at_timestamp, approved_by, \
    unapproved_at, unapproved_at_timestamp, unapproved_by, \
    deleted_at, deleted_at_timestamp, deleted_by, \
    body";

/// SQLite-backed store for records of type `B`.
pub struct SqliteRecordStore<B> {
    conn: std::sync::Mutex<rusqlite::Connection>,
    table: String,
    _body: PhantomData<fn() -> B>,
}

impl<B: RecordBody> SqliteRecordStore<B> {
    /// Open (or create) a database file and ensure the table for `B` exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, RecordStoreError> {
        let conn =
            rusqlite::Connection::open(path).map_err(|e| RecordStoreError::Other(e.to_string()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, RecordStoreError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| RecordStoreError::Other(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: rusqlite::Connection) -> Result<Self, RecordStoreError> {
        let table = format!("\"{}\"", B::RECORD_TYPE.replace('"', ""));
        let index_prefix = B::RECORD_TYPE.replace(|c: char| !c.is_ascii_alphanumeric(), "_");
        let created_by = if B::UNIQUE_CREATOR {
            "created_by INTEGER NOT NULL UNIQUE"
        } else {
            "created_by INTEGER NOT NULL"
        };

        // Initialize schema
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                id62 TEXT,
                nonce TEXT,
                site_id INTEGER,
                created_at TEXT NOT NULL,
                created_at_timestamp INTEGER NOT NULL,
                {created_by},
                updated_at TEXT,
                updated_at_timestamp INTEGER,
                published_at TEXT,
                published_at_timestamp INTEGER,
                published_by INTEGER,
                unpublished_at TEXT,
                unpublished_at_timestamp INTEGER,
                unpublished_by INTEGER,
                approved_at TEXT,
                approved_at_timestamp INTEGER,
                approved_by INTEGER,
                unapproved_at TEXT,
                unapproved_at_timestamp INTEGER,
                unapproved_by INTEGER,
                deleted_at TEXT,
                deleted_at_timestamp INTEGER,
                deleted_by INTEGER,
                body TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_{index_prefix}_id62 ON {table}(id62);
            CREATE INDEX IF NOT EXISTS idx_{index_prefix}_nonce ON {table}(nonce);
            CREATE INDEX IF NOT EXISTS idx_{index_prefix}_created ON {table}(created_at_timestamp);
            CREATE INDEX IF NOT EXISTS idx_{index_prefix}_deleted_by ON {table}(deleted_by);
            "#
        ))
        .map_err(|e| RecordStoreError::Other(e.to_string()))?;

        Ok(Self {
            conn: std::sync::Mutex::new(conn),
            table,
            _body: PhantomData,
        })
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T, RecordStoreError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RecordStoreError::Other(format!("failed to acquire lock: {}", e)))?;
        f(&conn).map_err(map_sqlite_error)
    }
}

fn map_sqlite_error(e: rusqlite::Error) -> RecordStoreError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            RecordStoreError::Conflict(e.to_string())
        }
        other => RecordStoreError::Other(other.to_string()),
    }
}

fn moment_cols(m: Option<Moment>) -> (Option<String>, Option<i64>) {
    match m {
        Some(m) => (Some(m.at.to_rfc3339()), Some(m.timestamp)),
        None => (None, None),
    }
}

fn stamp_cols(s: Option<&Stamp>) -> (Option<String>, Option<i64>, Option<i64>) {
    match s {
        Some(s) => (Some(s.at.to_rfc3339()), Some(s.timestamp), Some(s.by.0)),
        None => (None, None, None),
    }
}

fn parse_time(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn read_moment(row: &rusqlite::Row, idx: usize) -> Result<Option<Moment>, rusqlite::Error> {
    let at: Option<String> = row.get(idx)?;
    let timestamp: Option<i64> = row.get(idx + 1)?;
    match (at, timestamp) {
        (Some(at), Some(timestamp)) => Ok(Some(Moment {
            at: parse_time(idx, &at)?,
            timestamp,
        })),
        _ => Ok(None),
    }
}

fn read_stamp(row: &rusqlite::Row, idx: usize) -> Result<Option<Stamp>, rusqlite::Error> {
    let by: Option<i64> = row.get(idx + 2)?;
    match (read_moment(row, idx)?, by) {
        (Some(m), Some(by)) => Ok(Some(Stamp::new(m, UserId(by)))),
        _ => Ok(None),
    }
}

fn parse_record_row<B: RecordBody>(row: &rusqlite::Row) -> Result<Record<B>, rusqlite::Error> {
    let body_json: String = row.get(24)?;
    let body: B = serde_json::from_str(&body_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(24, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Record {
        id: row.get(0)?,
        id62: row.get(1)?,
        nonce: row.get(2)?,
        site: row.get::<_, Option<i64>>(3)?.map(SiteId),
        created: read_moment(row, 4)?,
        created_by: UserId(row.get(6)?),
        updated: read_moment(row, 7)?,
        publication: AxisState {
            positive: read_stamp(row, 9)?,
            negative: read_stamp(row, 12)?,
        },
        approval: AxisState {
            positive: read_stamp(row, 15)?,
            negative: read_stamp(row, 18)?,
        },
        deleted: read_moment(row, 21)?,
        deleted_by: row.get::<_, Option<i64>>(23)?.map(UserId),
        body,
    })
}

#[async_trait]
impl<B: RecordBody> RecordStore for SqliteRecordStore<B> {
    type Body = B;

    async fn write(&self, mut record: Record<B>) -> Result<Record<B>, RecordStoreError> {
        let created = record.created.ok_or_else(|| {
            RecordStoreError::Other("record has no creation stamp".to_string())
        })?;
        let body_json = serde_json::to_string(&record.body)
            .map_err(|e| RecordStoreError::Other(e.to_string()))?;

        let (created_at, created_ts) = moment_cols(Some(created));
        let (updated_at, updated_ts) = moment_cols(record.updated);
        let (pub_at, pub_ts, pub_by) = stamp_cols(record.publication.positive.as_ref());
        let (unpub_at, unpub_ts, unpub_by) = stamp_cols(record.publication.negative.as_ref());
        let (appr_at, appr_ts, appr_by) = stamp_cols(record.approval.positive.as_ref());
        let (unappr_at, unappr_ts, unappr_by) = stamp_cols(record.approval.negative.as_ref());
        let (del_at, del_ts) = moment_cols(record.deleted);

        let placeholders: Vec<String> = (1..=25).map(|i| format!("?{}", i)).collect();
        let updates: Vec<String> = COLUMNS
            .split(',')
            .map(str::trim)
            .filter(|c| *c != "id")
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
            self.table,
            COLUMNS,
            placeholders.join(", "),
            updates.join(", ")
        );

        let id = self.with_conn(|conn| {
            conn.execute(
                &sql,
                rusqlite::params![
                    record.id,
                    record.id62,
                    record.nonce,
                    record.site.map(|s| s.0),
                    created_at,
                    created_ts,
                    record.created_by.0,
                    updated_at,
                    updated_ts,
                    pub_at,
                    pub_ts,
                    pub_by,
                    unpub_at,
                    unpub_ts,
                    unpub_by,
                    appr_at,
                    appr_ts,
                    appr_by,
                    unappr_at,
                    unappr_ts,
                    unappr_by,
                    del_at,
                    del_ts,
                    record.deleted_by.map(|u| u.0),
                    body_json,
                ],
            )?;
            Ok(record.id.unwrap_or_else(|| conn.last_insert_rowid()))
        })?;

        record.id = Some(id);
        Ok(record)
    }

    async fn find_one(&self, filter: &RecordFilter) -> Result<Option<Record<B>>, RecordStoreError> {
        let (column, value) = match filter {
            RecordFilter::Id(id) => ("id", rusqlite::types::Value::Integer(*id)),
            RecordFilter::Id62(v) => ("id62", rusqlite::types::Value::Text(v.clone())),
            RecordFilter::Nonce(v) => ("nonce", rusqlite::types::Value::Text(v.clone())),
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY id LIMIT 1",
            COLUMNS, self.table, column
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            match stmt.query_row(rusqlite::params![value], parse_record_row::<B>) {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
    }

    async fn hard_delete(&self, record: &Record<B>) -> Result<bool, RecordStoreError> {
        let Some(id) = record.id else {
            return Ok(false);
        };
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.table);
        self.with_conn(|conn| {
            let count = conn.execute(&sql, [id])?;
            Ok(count > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use record_types::Side;
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

    fn moment(secs: i64) -> Moment {
        Moment {
            at: Utc.timestamp_opt(secs, 0).unwrap(),
            timestamp: secs,
        }
    }

    fn created<B: RecordBody>(by: i64, body: B) -> Record<B> {
        let mut r = Record::new(UserId(by), body);
        r.created = Some(moment(1_000));
        r.updated = Some(moment(1_000));
        r.site = Some(SiteId(1));
        r
    }

    #[tokio::test]
    async fn round_trips_lifecycle_columns() {
        let store = SqliteRecordStore::<Note>::open_in_memory().unwrap();
        let mut r = created(
            1,
            Note {
                text: "hello".to_string(),
            },
        );
        r.publication
            .mark(Side::Positive, Stamp::new(moment(2_000), UserId(2)));
        r.approval
            .mark(Side::Negative, Stamp::new(moment(3_000), UserId(3)));
        r.deleted = Some(moment(4_000));
        r.deleted_by = Some(UserId(4));

        let mut saved = store.write(r).await.unwrap();
        assert_eq!(saved.id, Some(1));
        saved.id62 = Some("1".to_string());
        let saved = store.write(saved).await.unwrap();
        assert_eq!(saved.id, Some(1));

        let loaded = store
            .find_one(&RecordFilter::Id62("1".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.published_by(), Some(UserId(2)));
        assert_eq!(loaded.unapproved_at_timestamp(), Some(3_000));
        assert_eq!(loaded.deleted_by, Some(UserId(4)));
    }

    #[tokio::test]
    async fn unsaved_record_without_creation_stamp_is_rejected() {
        let store = SqliteRecordStore::<Note>::open_in_memory().unwrap();
        let r = Record::new(
            UserId(1),
            Note {
                text: "x".to_string(),
            },
        );
        assert!(store.write(r).await.is_err());
    }

    #[tokio::test]
    async fn hard_delete_and_missing_lookup() {
        let store = SqliteRecordStore::<Note>::open_in_memory().unwrap();
        let saved = store
            .write(created(
                1,
                Note {
                    text: "gone".to_string(),
                },
            ))
            .await
            .unwrap();
        assert!(store.hard_delete(&saved).await.unwrap());
        assert!(store
            .find_one(&RecordFilter::Id(1))
            .await
            .unwrap()
            .is_none());
        assert!(!store.hard_delete(&saved).await.unwrap());
    }

    #[tokio::test]
    async fn unique_creator_maps_to_conflict() {
        let store = SqliteRecordStore::<Profile>::open_in_memory().unwrap();
        store
            .write(created(
                9,
                Profile {
                    bio: "a".to_string(),
                },
            ))
            .await
            .unwrap();
        let err = store
            .write(created(
                9,
                Profile {
                    bio: "b".to_string(),
                },
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordStoreError::Conflict(_)));
    }
}
