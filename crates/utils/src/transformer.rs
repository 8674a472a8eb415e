//! In-pipeline email message transformations.
//!
//! Transformers run after a raw message is parsed and before it is handed
//! to the sender. Each one takes the current [`EmailMessage`] and returns
//! a new one, the input is never modified. Concrete implementations live
//! in the [`transformers`](crate::transformers) module.

use std::{future::Future, pin::Pin};

use thiserror::Error;
use tracing::debug;

use crate::EmailMessage;

/// Result type for transformer operations.
pub type TransformResult = Result<EmailMessage, TransformError>;

/// Boxed future type for transformer operations, enabling async transformers.
pub type TransformFuture<'a> = Pin<Box<dyn Future<Output = TransformResult> + Send + 'a>>;

/// Errors that can occur while transforming a message.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The message carries no `From` header to rewrite.
    #[error("Message has no From header")]
    MissingFrom,
}

/// Trait for message transformers that rewrite emails in the pipeline.
pub trait MessageTransformer: Send + Sync {
    /// Produces a transformed copy of the message, possibly performing
    /// async operations.
    fn transform<'a>(&'a self, message: &'a EmailMessage) -> TransformFuture<'a>;

    /// Returns the name of this transformer.
    fn name(&self) -> &str;

    /// Applies a list of transformers to a message in order, feeding the
    /// output of each one into the next.
    fn apply<'a>(
        transformers: &'a [Box<dyn MessageTransformer>],
        message: &'a EmailMessage,
    ) -> TransformFuture<'a>
    where
        Self: Sized,
    {
        Box::pin(async move {
            let mut current = message.clone();
            for transformer in transformers {
                debug!(transformer = transformer.name(), "Applying transformer");
                let next = transformer.transform(&current).await?;
                current = next;
            }
            Ok(current)
        })
    }
}
