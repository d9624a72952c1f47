use crate::domain::validation::ValidationError;
use crate::domain::value::{MessageText, PhoneNumber, SenderId};

/// Upper bound on recipients accepted by a single SMS.RU `sms/send` call.
pub const SEND_SMS_MAX_RECIPIENTS: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub from: Option<SenderId>,
    /// Ask SMS.RU to validate the request without delivering or charging.
    pub test: bool,
}

/// One message text addressed to a list of recipients.
#[derive(Debug, Clone)]
pub struct SendSms {
    recipients: Vec<PhoneNumber>,
    msg: MessageText,
    options: SendOptions,
}

impl SendSms {
    pub fn to_many(
        recipients: Vec<PhoneNumber>,
        msg: MessageText,
        options: SendOptions,
    ) -> Result<Self, ValidationError> {
        if recipients.is_empty() {
            return Err(ValidationError::Empty {
                field: PhoneNumber::FIELD,
            });
        }
        if recipients.len() > SEND_SMS_MAX_RECIPIENTS {
            return Err(ValidationError::TooManyRecipients {
                max: SEND_SMS_MAX_RECIPIENTS,
                actual: recipients.len(),
            });
        }
        Ok(Self {
            recipients,
            msg,
            options,
        })
    }

    pub fn recipients(&self) -> &[PhoneNumber] {
        &self.recipients
    }

    pub fn msg(&self) -> &MessageText {
        &self.msg
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }
}
