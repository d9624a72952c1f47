//! Provider boundary: the capability that actually delivers a message.

mod smsru;

use std::error::Error as StdError;

use crate::domain::{PhoneNumber, StatusCode, ValidationError};

pub use smsru::{Auth, SmsRuProvider, SmsRuProviderBuilder};

/// Delivers one message text to a set of recipients.
///
/// Called at most once per [`Messenger::send`](crate::Messenger::send), with the
/// full deduplicated recipient list. Implementations are blocking and must not
/// retry on their own; failures surface to the caller unchanged.
pub trait Provider {
    fn send(&self, recipients: &[PhoneNumber], message: &str) -> Result<(), ProviderError>;
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn send(&self, recipients: &[PhoneNumber], message: &str) -> Result<(), ProviderError> {
        (**self).send(recipients, message)
    }
}

impl<P: Provider + ?Sized> Provider for &P {
    fn send(&self, recipients: &[PhoneNumber], message: &str) -> Result<(), ProviderError> {
        (**self).send(recipients, message)
    }
}

#[derive(Debug, thiserror::Error)]
/// Delivery failures reported by a [`Provider`].
///
/// This error preserves:
/// - HTTP-level failures (non-2xx status or transport failures),
/// - API-level failures (top-level `status != OK`),
/// - validation/parse failures.
pub enum ProviderError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The gateway answered with an `ERROR` status.
    #[error("API error: {status_code:?} {status_text:?}")]
    Api {
        status_code: StatusCode,
        status_text: Option<String>,
    },

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    #[error("invalid endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// The request could not be built from the given recipients or text.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Failure raised by a provider implemented outside this crate.
    #[error("provider error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}
