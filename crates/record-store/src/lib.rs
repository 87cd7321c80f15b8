//! Record store implementations: in-memory and (feature `sqlite`) SQLite.

mod memory;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::InMemoryRecordStore;
pub use record_types::{Record, RecordBody, RecordFilter, RecordStore, RecordStoreError};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRecordStore;
