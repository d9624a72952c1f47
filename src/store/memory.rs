use chrono::Utc;

use crate::domain::{NewRecord, OutboundRecord, RecordId};
use crate::store::{RecordStore, StoreError};

/// Record store kept entirely in memory.
///
/// Identifiers are sequential, starting at 1.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Vec<OutboundRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(records: Vec<OutboundRecord>) -> Self {
        Self { records }
    }

    /// All records in creation order.
    pub fn records(&self) -> &[OutboundRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&OutboundRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn next_id(&self) -> RecordId {
        let last = self.records.iter().map(|r| r.id.value()).max().unwrap_or(0);
        RecordId::new(last + 1)
    }
}

impl RecordStore for MemoryRecordStore {
    fn create(&mut self, record: NewRecord) -> Result<RecordId, StoreError> {
        let id = self.next_id();
        self.records.push(OutboundRecord::from_new(id, record, Utc::now()));
        Ok(id)
    }

    fn update_sent(&mut self, ids: &[RecordId], sent: bool) -> Result<(), StoreError> {
        if let Some(missing) = ids.iter().find(|id| self.get(**id).is_none()) {
            return Err(StoreError::UnknownRecord(*missing));
        }

        let now = Utc::now();
        for record in self.records.iter_mut().filter(|r| ids.contains(&r.id)) {
            record.sent = sent;
            record.updated_at = now;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::PhoneNumber;

    use super::*;

    fn new_record(digits: &str) -> NewRecord {
        NewRecord {
            phone: PhoneNumber::new(digits).unwrap(),
            message: "hello".to_owned(),
            sent: false,
        }
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let mut store = MemoryRecordStore::new();
        let first = store.create(new_record("9045344321")).unwrap();
        let second = store.create(new_record("79045342314")).unwrap();

        assert_eq!(first, RecordId::new(1));
        assert_eq!(second, RecordId::new(2));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(second).unwrap().phone.as_str(), "79045342314");
    }

    #[test]
    fn update_sent_flips_only_listed_records() {
        let mut store = MemoryRecordStore::new();
        let first = store.create(new_record("9045344321")).unwrap();
        let second = store.create(new_record("79045342314")).unwrap();

        store.update_sent(&[second], true).unwrap();

        assert!(!store.get(first).unwrap().sent);
        let updated = store.get(second).unwrap();
        assert!(updated.sent);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn update_sent_rejects_unknown_ids_without_partial_update() {
        let mut store = MemoryRecordStore::new();
        let known = store.create(new_record("9045344321")).unwrap();

        let err = store
            .update_sent(&[known, RecordId::new(99)], true)
            .unwrap_err();

        assert!(matches!(err, StoreError::UnknownRecord(id) if id == RecordId::new(99)));
        assert!(!store.get(known).unwrap().sent);
    }

    #[test]
    fn works_through_a_mutable_reference() {
        fn persist(mut store: impl RecordStore) -> RecordId {
            store.create(new_record("9045344321")).unwrap()
        }

        let mut store = MemoryRecordStore::new();
        let id = persist(&mut store);
        assert!(store.get(id).is_some());
    }
}
