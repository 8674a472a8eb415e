//! Outbound delivery of rewritten messages.
//!
//! [`SesSender`] (feature-gated behind `aws`) hands raw messages to SES,
//! [`MemorySender`] records them for tests.

mod memory;
#[cfg(feature = "aws")]
mod ses;

use std::{future::Future, pin::Pin};

use thiserror::Error;

pub use memory::*;
#[cfg(feature = "aws")]
pub use ses::*;

/// Result type for send operations.
pub type SendResult = Result<(), SendError>;

/// Boxed future type for send operations, enabling object safety.
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = SendResult> + Send + 'a>>;

/// Errors that can occur while sending a message.
#[derive(Debug, Error)]
pub enum SendError {
    /// The outbound service rejected or failed the request.
    #[error("Send error: {0}")]
    Backend(String),
}

/// Trait for outbound mail services.
pub trait MessageSender: Send + Sync {
    /// Sends the serialized message `raw` to `destination`.
    fn send<'a>(&'a self, destination: &'a str, raw: &'a [u8]) -> SendFuture<'a>;

    /// Returns the name of this sender.
    fn name(&self) -> &str;
}
