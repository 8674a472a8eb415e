//! Typed Lambda event payloads.
//!
//! The handler is triggered either by an SNS notification carrying the
//! whole message ([`InlineDelivery`]) or by an SES receipt whose message
//! was written to a bucket ([`StoredDelivery`]). Both are decoded from the
//! Lambda `Records` array into [`EventRecord`] variants.

use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while decoding an event.
#[derive(Debug, Error)]
pub enum EventError {
    /// The payload or the embedded notification is not the expected JSON.
    #[error("Event decode error: {0}")]
    Json(#[from] serde_json::Error),
    /// The inline message content is not valid base64.
    #[error("Content decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The event carries no records.
    #[error("Event carries no records")]
    Empty,
}

/// A Lambda invocation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

impl ForwardEvent {
    /// Decodes an event from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        let event: Self = serde_json::from_value(value)?;
        event.validated()
    }

    /// Decodes an event from JSON bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, EventError> {
        let event: Self = serde_json::from_slice(data)?;
        event.validated()
    }

    fn validated(self) -> Result<Self, EventError> {
        if self.records.is_empty() {
            return Err(EventError::Empty);
        }
        Ok(self)
    }
}

/// A single record of a [`ForwardEvent`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EventRecord {
    /// The message content travels inside the notification.
    Inline(InlineDelivery),
    /// The message content sits in the object store.
    Stored(StoredDelivery),
}

/// SNS record wrapping an SES notification with the message content.
#[derive(Debug, Clone, Deserialize)]
pub struct InlineDelivery {
    #[serde(rename = "Sns")]
    sns: SnsEntity,
}

#[derive(Debug, Clone, Deserialize)]
struct SnsEntity {
    /// JSON-encoded SES notification.
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct SesNotification {
    /// Base64-encoded raw message.
    content: String,
}

impl InlineDelivery {
    /// Decodes the raw message carried by the notification.
    pub fn raw_message(&self) -> Result<Vec<u8>, EventError> {
        let notification: SesNotification = serde_json::from_str(&self.sns.message)?;
        let content: String = notification
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        Ok(general_purpose::STANDARD.decode(content)?)
    }
}

/// SES receipt record referencing a stored message.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredDelivery {
    ses: SesEntity,
}

#[derive(Debug, Clone, Deserialize)]
struct SesEntity {
    mail: SesMail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SesMail {
    message_id: String,
}

impl StoredDelivery {
    /// Returns the SES message identifier, which is also the object key.
    pub fn message_id(&self) -> &str {
        &self.ses.mail.message_id
    }
}
