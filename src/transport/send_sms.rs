use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{
    MessageText, PhoneNumber, SendSms, SendSmsResponse, SenderId, SmsResult, Status, StatusCode,
};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum TransportStatus {
    Ok,
    Error,
}

impl From<TransportStatus> for Status {
    fn from(value: TransportStatus) -> Self {
        match value {
            TransportStatus::Ok => Status::Ok,
            TransportStatus::Error => Status::Error,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SendSmsJsonResponse {
    status: TransportStatus,
    status_code: i32,
    #[serde(default)]
    status_text: Option<String>,
    #[serde(default)]
    balance: Option<TransportBalance>,
    #[serde(default)]
    sms: BTreeMap<String, SmsJsonResult>,
}

/// SMS.RU reports the balance as either a JSON string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TransportBalance {
    String(String),
    Number(serde_json::Number),
}

impl TransportBalance {
    fn into_string(self) -> String {
        match self {
            Self::String(value) => value,
            Self::Number(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SmsJsonResult {
    status: TransportStatus,
    status_code: i32,
    #[serde(default)]
    status_text: Option<String>,
    #[serde(default)]
    sms_id: Option<String>,
}

pub fn encode_send_sms_form(request: &SendSms) -> Vec<(String, String)> {
    let mut params = vec![("json".to_owned(), "1".to_owned())];

    let to = request
        .recipients()
        .iter()
        .map(PhoneNumber::as_str)
        .collect::<Vec<_>>()
        .join(",");
    params.push((PhoneNumber::FIELD.to_owned(), to));
    params.push((
        MessageText::FIELD.to_owned(),
        request.msg().as_str().to_owned(),
    ));

    let options = request.options();
    if let Some(from) = options.from.as_ref() {
        params.push((SenderId::FIELD.to_owned(), from.as_str().to_owned()));
    }
    if options.test {
        params.push(("test".to_owned(), "1".to_owned()));
    }

    params
}

/// Decode a `sms/send` JSON body, keying per-recipient results by the
/// request's numbers.
///
/// SMS.RU may echo a number with a `+` or with a country prefix the caller
/// omitted; keys that still match no recipient are dropped with a warning.
pub fn decode_send_sms_json_response(
    request: &SendSms,
    json: &str,
) -> Result<SendSmsResponse, TransportError> {
    let parsed: SendSmsJsonResponse = serde_json::from_str(json)?;

    let mut sms = BTreeMap::new();
    for (key, value) in parsed.sms {
        let Some(phone) = match_phone_key(request.recipients(), &key) else {
            tracing::warn!(key = %key, "sms.ru response mentions an unknown recipient");
            continue;
        };
        sms.insert(
            phone,
            SmsResult {
                status: value.status.into(),
                status_code: StatusCode::new(value.status_code),
                status_text: value.status_text,
                sms_id: value.sms_id,
            },
        );
    }

    Ok(SendSmsResponse {
        status: parsed.status.into(),
        status_code: StatusCode::new(parsed.status_code),
        status_text: parsed.status_text,
        balance: parsed.balance.map(TransportBalance::into_string),
        sms,
    })
}

fn match_phone_key(recipients: &[PhoneNumber], key: &str) -> Option<PhoneNumber> {
    let key = key.trim().trim_start_matches('+');
    recipients
        .iter()
        .find(|phone| phone.as_str() == key)
        .or_else(|| recipients.iter().find(|phone| key.ends_with(phone.as_str())))
        .cloned()
}
