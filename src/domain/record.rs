use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value::{PhoneNumber, RecordId};

/// Fields supplied when a delivery attempt is first persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub phone: PhoneNumber,
    pub message: String,
    pub sent: bool,
}

/// One persisted delivery attempt to one recipient.
///
/// `sent` only ever moves from `false` to `true`, after the provider accepted
/// the batch. Records are never deleted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRecord {
    pub id: RecordId,
    pub phone: PhoneNumber,
    pub message: String,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutboundRecord {
    pub fn from_new(id: RecordId, record: NewRecord, now: DateTime<Utc>) -> Self {
        Self {
            id,
            phone: record.phone,
            message: record.message,
            sent: record.sent,
            created_at: now,
            updated_at: now,
        }
    }
}
