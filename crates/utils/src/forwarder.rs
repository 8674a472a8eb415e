//! The forwarding pipeline run for every invocation.
//!
//! [`Forwarder`] turns each [`EventRecord`] into one outbound message:
//! the raw message is obtained (decoded from the event or fetched from the
//! [`ObjectStore`]), parsed, passed through the transformers and sent to
//! the configured target. Stored objects are deleted only once the send
//! succeeded, so a failed send leaves the message in place for a retry.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    is_mime_valid, Config, EmailMessage, EnvelopeRewriter, EventError, EventRecord, ForwardEvent,
    InlineDelivery, MessageSender, MessageTransformer, ObjectStore, SendError, StorageError,
    StoredDelivery, TransformError,
};

/// Result type for forwarding operations.
pub type ForwardResult<T> = Result<T, ForwardError>;

/// Errors that can occur while forwarding a message.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Send(#[from] SendError),
    /// A stored delivery arrived but no object store is configured.
    #[error("Object store not configured, set S3_BUCKET_NAME to handle stored deliveries")]
    StoreNotConfigured,
}

/// Re-mails inbound messages to the configured target.
pub struct Forwarder {
    config: Config,
    sender: Arc<dyn MessageSender>,
    store: Option<Arc<dyn ObjectStore>>,
    transformers: Vec<Box<dyn MessageTransformer>>,
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("config", &self.config)
            .field("sender", &self.sender.name())
            .field("store", &self.store.as_ref().map(|s| s.name()))
            .field("transformers", &self.transformers.len())
            .finish()
    }
}

impl Forwarder {
    /// Creates a new [`Forwarder`] sending through `sender`, with the
    /// envelope rewriter for the configured source identity.
    pub fn new(config: Config, sender: Arc<dyn MessageSender>) -> Self {
        let transformers: Vec<Box<dyn MessageTransformer>> = vec![Box::new(
            EnvelopeRewriter::new(config.source_email.clone()),
        )];
        Self {
            config,
            sender,
            store: None,
            transformers,
        }
    }

    /// Sets the object store used for stored deliveries.
    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Returns the forwarding configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handles every record of `event` in order, stopping at the first failure.
    pub async fn handle(&self, event: &ForwardEvent) -> ForwardResult<()> {
        for (index, record) in event.records.iter().enumerate() {
            debug!(record = index, "Handling record");
            self.handle_record(record).await?;
        }
        Ok(())
    }

    /// Handles a single record.
    pub async fn handle_record(&self, record: &EventRecord) -> ForwardResult<()> {
        match record {
            EventRecord::Inline(delivery) => self.handle_inline(delivery).await,
            EventRecord::Stored(delivery) => self.handle_stored(delivery).await,
        }
    }

    async fn handle_inline(&self, delivery: &InlineDelivery) -> ForwardResult<()> {
        let raw = delivery.raw_message().map_err(|e| {
            error!(error = %e, "Failed to decode inline message");
            e
        })?;
        self.forward_raw(&raw).await?;
        Ok(())
    }

    async fn handle_stored(&self, delivery: &StoredDelivery) -> ForwardResult<()> {
        let store = self.store.as_ref().ok_or_else(|| {
            error!(
                message_id = %delivery.message_id(),
                "Stored delivery received without an object store"
            );
            ForwardError::StoreNotConfigured
        })?;
        let key = delivery.message_id();

        let raw = store.fetch(key).await.map_err(|e| {
            error!(store = store.name(), key = %key, error = %e, "Failed to fetch message");
            e
        })?;
        self.forward_raw(&raw).await?;

        store.delete(key).await.map_err(|e| {
            error!(store = store.name(), key = %key, error = %e, "Failed to delete forwarded message");
            e
        })?;
        info!(store = store.name(), key = %key, "Removed forwarded message");
        Ok(())
    }

    /// Parses, rewrites and sends a raw message to the target, returning
    /// the message that was sent.
    pub async fn forward_raw(&self, raw: &[u8]) -> ForwardResult<EmailMessage> {
        let message = EmailMessage::parse(raw);
        if !is_mime_valid(raw) {
            debug!("Message has no MIME-Version header");
        }

        let rewritten = <EnvelopeRewriter as MessageTransformer>::apply(&self.transformers, &message)
            .await
            .map_err(|e| {
                warn!(subject = %message.subject(), error = %e, "Failed to rewrite message");
                e
            })?;

        self.sender
            .send(&self.config.target_email, rewritten.raw())
            .await
            .map_err(|e| {
                error!(
                    sender = self.sender.name(),
                    target = %self.config.target_email,
                    error = %e,
                    "Failed to forward message"
                );
                e
            })?;

        info!(
            from = rewritten.header("From").unwrap_or_default(),
            reply_to = rewritten.header("Reply-To").unwrap_or_default(),
            to = %self.config.target_email,
            subject = %rewritten.subject(),
            size = rewritten.raw().len(),
            "Forwarded message"
        );
        Ok(rewritten)
    }
}
