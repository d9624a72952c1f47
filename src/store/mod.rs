//! Record store boundary: persistence for outbound delivery attempts.

mod json_file;
mod memory;

use std::error::Error as StdError;

use crate::domain::{NewRecord, RecordId};

pub use json_file::JsonFileStore;
pub use memory::MemoryRecordStore;

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`RecordStore`] implementations.
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown record: {0}")]
    UnknownRecord(RecordId),

    /// Failure raised by a store implemented outside this crate.
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

/// Persistence used by the [`Messenger`](crate::Messenger).
///
/// Only two operations are required: create one record per delivery attempt
/// and flip the `sent` flag on a batch of records afterwards.
pub trait RecordStore {
    /// Persist a record and return its identifier.
    fn create(&mut self, record: NewRecord) -> Result<RecordId, StoreError>;

    /// Set `sent` on every listed record.
    ///
    /// Fails with [`StoreError::UnknownRecord`] before touching anything if an
    /// identifier is not present.
    fn update_sent(&mut self, ids: &[RecordId], sent: bool) -> Result<(), StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for &mut S {
    fn create(&mut self, record: NewRecord) -> Result<RecordId, StoreError> {
        (**self).create(record)
    }

    fn update_sent(&mut self, ids: &[RecordId], sent: bool) -> Result<(), StoreError> {
        (**self).update_sent(ids, sent)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn create(&mut self, record: NewRecord) -> Result<RecordId, StoreError> {
        (**self).create(record)
    }

    fn update_sent(&mut self, ids: &[RecordId], sent: bool) -> Result<(), StoreError> {
        (**self).update_sent(ids, sent)
    }
}
