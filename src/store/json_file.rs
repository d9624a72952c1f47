use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::{NewRecord, OutboundRecord, RecordId};
use crate::store::{MemoryRecordStore, RecordStore, StoreError};

/// Record store persisted as a pretty-printed JSON array on disk.
///
/// The whole file is rewritten after every mutation, through a sibling
/// temporary file and a rename. A mutation whose write fails is undone in
/// memory, so the file and [`records`](Self::records) stay in step.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryRecordStore,
}

impl JsonFileStore {
    /// Open `path`, loading existing records. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str::<Vec<OutboundRecord>>(&contents)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), records = records.len(), "opened record file");
        Ok(Self {
            path,
            inner: MemoryRecordStore::from_records(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[OutboundRecord] {
        self.inner.records()
    }

    pub fn get(&self, id: RecordId) -> Option<&OutboundRecord> {
        self.inner.get(id)
    }

    fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self.inner.records())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn flush_or_restore(&mut self, before: MemoryRecordStore) -> Result<(), StoreError> {
        if let Err(err) = self.flush() {
            tracing::warn!(path = %self.path.display(), error = %err, "record file write failed");
            self.inner = before;
            return Err(err);
        }
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn create(&mut self, record: NewRecord) -> Result<RecordId, StoreError> {
        let before = self.inner.clone();
        let id = self.inner.create(record)?;
        self.flush_or_restore(before)?;
        Ok(id)
    }

    fn update_sent(&mut self, ids: &[RecordId], sent: bool) -> Result<(), StoreError> {
        let before = self.inner.clone();
        self.inner.update_sent(ids, sent)?;
        self.flush_or_restore(before)
    }
}
