//! Recorded SMS dispatch.
//!
//! A [`Messenger`] sanitizes and deduplicates recipient numbers, decorates the
//! message text, writes one [`OutboundRecord`] per recipient to a
//! [`RecordStore`], and hands the batch to a [`Provider`] only when the
//! injected [`Environment`] is production. The bundled [`SmsRuProvider`]
//! delivers through the SMS.RU HTTP API.
//!
//! ```rust,no_run
//! use sms_outbox::{Environment, JsonFileStore, Messenger, SmsConfig, SmsRuProvider};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SmsConfig::from_env()?;
//!     let store = JsonFileStore::open("outbox.json")?;
//!     let mut messenger = Messenger::builder(store)
//!         .provider(SmsRuProvider::from_config(&config)?)
//!         .environment(Environment::Production)
//!         .build()?;
//!     let report = messenger.push(["+7 904 534-23-14"], "hello")?;
//!     println!("{} record(s), delivered: {}", report.record_ids.len(), report.delivered);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod logging;
pub mod messenger;
pub mod provider;
pub mod sanitize;
pub mod store;
mod transport;

pub use config::{ConfigError, Environment, SmsConfig};
pub use domain::{
    MessageText, NewRecord, OutboundRecord, PhoneNumber, RecordId, SenderId, StatusCode,
    ValidationError,
};
pub use messenger::{
    Decorator, Messenger, MessengerBuilder, MessengerError, SendReport, quick, quick_with,
};
pub use provider::{Auth, Provider, ProviderError, SmsRuProvider, SmsRuProviderBuilder};
pub use sanitize::{DigitSanitizer, RegionSanitizer, Sanitizer};
pub use store::{JsonFileStore, MemoryRecordStore, RecordStore, StoreError};
