//! Messenger: validates recipients, records every attempt, and dispatches to a
//! [`Provider`] when running in production.

use crate::config::{ConfigError, Environment, SmsConfig};
use crate::domain::{NewRecord, PhoneNumber, RecordId, ValidationError};
use crate::provider::{Provider, ProviderError, SmsRuProvider};
use crate::sanitize::{DigitSanitizer, Sanitizer};
use crate::store::{RecordStore, StoreError};

/// Message transformation applied once, when the text is set.
pub type Decorator = Box<dyn Fn(&str) -> String>;

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`Messenger`] and the [`quick`] factories.
pub enum MessengerError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A record could not be created. `record_ids` were created before the
    /// failure; the provider was not called.
    #[error("recording failed after {} record(s): {source}", .record_ids.len())]
    Record {
        record_ids: Vec<RecordId>,
        #[source]
        source: StoreError,
    },

    /// The default provider could not be built from configuration.
    #[error("provider setup failed: {0}")]
    ProviderSetup(#[source] ProviderError),

    /// The provider failed. `record_ids` were persisted and remain unsent.
    #[error("delivery failed, {} record(s) left unsent: {source}", .record_ids.len())]
    Delivery {
        record_ids: Vec<RecordId>,
        #[source]
        source: ProviderError,
    },

    /// The provider accepted the message but `record_ids` could not be marked
    /// sent. Sending again would deliver twice.
    #[error("message delivered but {} record(s) not marked sent: {source}", .record_ids.len())]
    MarkSent {
        record_ids: Vec<RecordId>,
        #[source]
        source: StoreError,
    },
}

/// Outcome of [`Messenger::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    /// One record per recipient, in recipient order.
    pub record_ids: Vec<RecordId>,
    /// `true` when the provider accepted the message and the records were
    /// marked sent; `false` outside production.
    pub delivered: bool,
}

/// Builder for [`Messenger`].
///
/// A provider is mandatory: [`MessengerBuilder::build`] fails with
/// [`ConfigError::MissingProvider`] without one.
pub struct MessengerBuilder<S> {
    store: S,
    provider: Option<Box<dyn Provider>>,
    sanitizer: Box<dyn Sanitizer>,
    decorator: Decorator,
    environment: Environment,
    numbers: Vec<String>,
    message: String,
}

impl<S: RecordStore> MessengerBuilder<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            provider: None,
            sanitizer: Box::new(DigitSanitizer),
            decorator: Box::new(str::to_owned),
            environment: Environment::default(),
            numbers: Vec::new(),
            message: String::new(),
        }
    }

    pub fn provider(mut self, provider: impl Provider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    pub fn sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    pub fn decorator(mut self, decorator: impl Fn(&str) -> String + 'static) -> Self {
        self.decorator = Box::new(decorator);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.numbers.push(number.into());
        self
    }

    pub fn numbers<I, T>(mut self, numbers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.numbers.extend(numbers.into_iter().map(Into::into));
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Decorate the message and add every number, in that order.
    pub fn build(self) -> Result<Messenger<S>, MessengerError> {
        let provider = self.provider.ok_or(ConfigError::MissingProvider)?;
        let mut messenger = Messenger {
            numbers: Vec::new(),
            message: String::new(),
            decorator: self.decorator,
            sanitizer: self.sanitizer,
            provider,
            environment: self.environment,
            store: self.store,
        };
        messenger.set_message(self.message);
        messenger.set_numbers(self.numbers)?;
        Ok(messenger)
    }
}

/// Sends one message to a deduplicated list of recipients.
///
/// Each instance covers one logical message: configure, then [`send`](Self::send).
/// Every recipient gets an outbound record with `sent = false`; only in
/// [`Environment::Production`] is the provider called, after which the
/// records are flipped to `sent = true`.
pub struct Messenger<S> {
    numbers: Vec<PhoneNumber>,
    message: String,
    decorator: Decorator,
    sanitizer: Box<dyn Sanitizer>,
    provider: Box<dyn Provider>,
    environment: Environment,
    store: S,
}

impl<S: RecordStore> Messenger<S> {
    pub fn builder(store: S) -> MessengerBuilder<S> {
        MessengerBuilder::new(store)
    }

    /// Recipients in first-seen order.
    pub fn numbers(&self) -> &[PhoneNumber] {
        &self.numbers
    }

    /// The message as decorated when it was set.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the current decorator over `text` and keep the result.
    pub fn set_message(&mut self, text: impl Into<String>) -> &mut Self {
        let text: String = text.into();
        self.message = (self.decorator)(text.as_str());
        self
    }

    /// Replace the decorator for later [`set_message`](Self::set_message) calls.
    ///
    /// The current message is left as is.
    pub fn set_message_decorator(
        &mut self,
        decorator: impl Fn(&str) -> String + 'static,
    ) -> &mut Self {
        self.decorator = Box::new(decorator);
        self
    }

    /// Sanitize and validate `number`, then append it unless already present.
    pub fn add_number(&mut self, number: impl AsRef<str>) -> Result<&mut Self, ValidationError> {
        let raw = number.as_ref();
        let phone = PhoneNumber::new(self.sanitizer.sanitize(raw))
            .map_err(|err| match err {
                ValidationError::PhoneNumberLength { digits, .. } => {
                    ValidationError::PhoneNumberLength {
                        input: raw.to_owned(),
                        digits,
                    }
                }
                ValidationError::InvalidPhoneNumber { .. } => {
                    ValidationError::InvalidPhoneNumber {
                        input: raw.to_owned(),
                    }
                }
                other => other,
            })
            .inspect_err(|err| {
                tracing::debug!(error = %err, "rejected phone number");
            })?;

        if self.numbers.contains(&phone) {
            tracing::debug!(phone = %phone, "skipping duplicate phone number");
        } else {
            self.numbers.push(phone);
        }
        Ok(self)
    }

    /// [`add_number`](Self::add_number) for each element, stopping at the first
    /// invalid one. Numbers before it stay added.
    pub fn set_numbers<I, T>(&mut self, numbers: I) -> Result<&mut Self, ValidationError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for number in numbers {
            self.add_number(number)?;
        }
        Ok(self)
    }

    pub fn set_sanitizer(&mut self, sanitizer: impl Sanitizer + 'static) -> &mut Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    pub fn set_provider(&mut self, provider: impl Provider + 'static) -> &mut Self {
        self.provider = Box::new(provider);
        self
    }

    pub fn set_environment(&mut self, environment: Environment) -> &mut Self {
        self.environment = environment;
        self
    }

    /// Record the message for every recipient and deliver it in production.
    ///
    /// If the provider fails the records stay `sent = false` and their ids are
    /// returned in [`MessengerError::Delivery`]. Nothing is retried.
    pub fn send(&mut self) -> Result<SendReport, MessengerError> {
        let mut record_ids = Vec::with_capacity(self.numbers.len());
        for phone in &self.numbers {
            let created = self.store.create(NewRecord {
                phone: phone.clone(),
                message: self.message.clone(),
                sent: false,
            });
            let id = match created {
                Ok(id) => id,
                Err(source) => return Err(MessengerError::Record { record_ids, source }),
            };
            tracing::debug!(record = %id, phone = %phone, "recorded outbound message");
            record_ids.push(id);
        }

        if !self.environment.is_production() {
            tracing::info!(
                environment = %self.environment,
                recipients = record_ids.len(),
                "not in production, message recorded without delivery"
            );
            return Ok(SendReport {
                record_ids,
                delivered: false,
            });
        }

        if self.numbers.is_empty() {
            tracing::debug!("no recipients, nothing to deliver");
            return Ok(SendReport {
                record_ids,
                delivered: false,
            });
        }

        tracing::info!(recipients = self.numbers.len(), "delivering message");
        if let Err(source) = self.provider.send(&self.numbers, &self.message) {
            tracing::warn!(
                error = %source,
                records = record_ids.len(),
                "delivery failed, records left unsent"
            );
            return Err(MessengerError::Delivery { record_ids, source });
        }

        if let Err(source) = self.store.update_sent(&record_ids, true) {
            tracing::warn!(
                error = %source,
                records = record_ids.len(),
                "message delivered but records not marked sent"
            );
            return Err(MessengerError::MarkSent { record_ids, source });
        }
        Ok(SendReport {
            record_ids,
            delivered: true,
        })
    }

    /// Set the message, add `numbers`, and [`send`](Self::send).
    pub fn push<I, T>(
        &mut self,
        numbers: I,
        message: impl Into<String>,
    ) -> Result<SendReport, MessengerError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.set_message(message);
        self.set_numbers(numbers)?;
        self.send()
    }
}

/// One-shot send to a single number through the default SMS.RU provider
/// built from `config`, honouring `config.environment`.
pub fn quick<S: RecordStore>(
    config: &SmsConfig,
    store: S,
    number: &str,
    message: &str,
) -> Result<SendReport, MessengerError> {
    let provider = SmsRuProvider::from_config(config).map_err(MessengerError::ProviderSetup)?;
    quick_with(provider, config.environment, store, number, message)
}

/// One-shot send to a single number through an explicit provider.
pub fn quick_with<S: RecordStore>(
    provider: impl Provider + 'static,
    environment: Environment,
    store: S,
    number: &str,
    message: &str,
) -> Result<SendReport, MessengerError> {
    Messenger::builder(store)
        .provider(provider)
        .environment(environment)
        .number(number)
        .message(message)
        .build()?
        .send()
}
