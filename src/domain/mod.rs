//! Domain layer: strong types with validation and invariants (no I/O).

mod record;
mod request;
mod response;
mod validation;
mod value;

pub use record::{NewRecord, OutboundRecord};
pub use request::{SEND_SMS_MAX_RECIPIENTS, SendOptions, SendSms};
pub use response::{SendSmsResponse, SmsResult, Status};
pub use validation::ValidationError;
pub use value::{
    ApiId, Login, MessageText, Password, PhoneNumber, RecordId, SenderId, StatusCode,
};

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn phone(digits: &str) -> PhoneNumber {
        PhoneNumber::new(digits).unwrap()
    }

    #[test]
    fn send_sms_requires_recipients() {
        let msg = MessageText::new("hi").unwrap();
        let err = SendSms::to_many(Vec::new(), msg, SendOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Empty {
                field: PhoneNumber::FIELD
            }
        ));
    }

    #[test]
    fn send_sms_recipient_limit_is_enforced() {
        let msg = MessageText::new("hi").unwrap();
        let recipients = vec![phone("79251234567"); SEND_SMS_MAX_RECIPIENTS + 1];
        let err = SendSms::to_many(recipients, msg, SendOptions::default()).unwrap_err();
        assert!(matches!(err, ValidationError::TooManyRecipients { .. }));
    }

    #[test]
    fn outbound_record_starts_with_creation_timestamps() {
        let now = Utc::now();
        let record = OutboundRecord::from_new(
            RecordId::new(7),
            NewRecord {
                phone: phone("9045344321"),
                message: "hello".to_owned(),
                sent: false,
            },
            now,
        );
        assert_eq!(record.id, RecordId::new(7));
        assert!(!record.sent);
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn outbound_record_serializes_phone_as_plain_string() {
        let record = OutboundRecord::from_new(
            RecordId::new(1),
            NewRecord {
                phone: phone("79045342314"),
                message: "hi".to_owned(),
                sent: true,
            },
            Utc::now(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["phone"], "79045342314");
        assert_eq!(json["id"], 1);
        assert_eq!(json["sent"], true);
    }
}
