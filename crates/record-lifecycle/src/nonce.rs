//! Idempotent record lookup by client-supplied nonce.

use record_types::{Record, RecordBody};

/// A record found by nonce, or a fresh one carrying that nonce.
#[derive(Debug, Clone)]
pub struct NonceObject<B> {
    record: Record<B>,
}

impl<B: RecordBody> NonceObject<B> {
    pub(crate) fn new(record: Record<B>) -> Self {
        Self { record }
    }

    /// True when the record was already stored under this nonce.
    pub fn is_exist(&self) -> bool {
        self.record.is_persisted()
    }

    pub fn record(&self) -> &Record<B> {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record<B> {
        &mut self.record
    }

    pub fn into_record(self) -> Record<B> {
        self.record
    }
}
