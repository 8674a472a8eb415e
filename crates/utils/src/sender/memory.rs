use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError,
};

use tracing::debug;

use crate::{MessageSender, SendError, SendFuture};

/// A message recorded by [`MemorySender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub destination: String,
    pub raw: Vec<u8>,
}

/// Sender that keeps messages in memory instead of delivering them.
///
/// Can be switched into a failing mode to simulate an outbound outage.
#[derive(Debug, Default)]
pub struct MemorySender {
    sent: Mutex<Vec<SentMessage>>,
    failing: AtomicBool,
}

impl MemorySender {
    /// Creates a new [`MemorySender`] that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`MemorySender`] that rejects every message.
    pub fn failing() -> Self {
        let sender = Self::default();
        sender.set_failing(true);
        sender
    }

    /// Switches the failing mode on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MessageSender for MemorySender {
    fn send<'a>(&'a self, destination: &'a str, raw: &'a [u8]) -> SendFuture<'a> {
        Box::pin(async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(SendError::Backend("simulated send failure".to_string()));
            }
            debug!(destination = %destination, size = raw.len(), "Recording sent message");
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(SentMessage {
                    destination: destination.to_string(),
                    raw: raw.to_vec(),
                });
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
