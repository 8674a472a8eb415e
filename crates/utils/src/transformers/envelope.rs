use std::sync::LazyLock;

use regex::bytes::Regex;
use tracing::{debug, info};

use crate::{
    EmailMessage, HeaderField, MessageTransformer, TransformError, TransformFuture,
    TransformResult,
};

/// Headers carried over from the inbound message, everything else is dropped.
pub const KEPT_HEADERS: [&str; 4] = ["Subject", "To", "Content-Type", "From"];

/// Matches a `Display Name <address>` mailbox, anchored at the start only.
///
/// Runs on raw bytes with Unicode disabled, so 8-bit display names match.
static DISPLAY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^(.*)\s<(.*)>").expect("valid display name pattern"));

/// Transformer that re-addresses a message so it can be sent from a
/// verified identity.
///
/// The original `From` is moved to `Reply-To`, so replies still reach the
/// original sender, and `From` becomes the configured source address,
/// keeping the original display name when there is one. Only
/// [`KEPT_HEADERS`] survive the rewrite, and they are carried over byte
/// for byte.
pub struct EnvelopeRewriter {
    source_email: String,
}

impl EnvelopeRewriter {
    /// Creates a new [`EnvelopeRewriter`] sending on behalf of `source_email`.
    pub fn new(source_email: String) -> Self {
        info!(source = %source_email, "Envelope rewriter initialized");
        Self { source_email }
    }

    /// Computes the new `From` value for an unfolded original `From` value.
    ///
    /// `Alice <a@x.com>` becomes `Alice <source>`, anything without a
    /// display name becomes the bare source address. The display name
    /// bytes are kept as they are.
    pub fn rewrite_from(&self, original: &[u8]) -> Vec<u8> {
        match DISPLAY_NAME.captures(original).and_then(|c| c.get(1)) {
            Some(name) if !name.as_bytes().trim_ascii().is_empty() => {
                let mut value = name.as_bytes().to_vec();
                value.extend_from_slice(b" <");
                value.extend_from_slice(self.source_email.as_bytes());
                value.push(b'>');
                value
            }
            _ => self.source_email.as_bytes().to_vec(),
        }
    }

    /// Builds the rewritten message from `message`.
    ///
    /// Kept headers stay in their original order with their raw bytes, the
    /// first `From` is replaced in place (any further `From` is dropped)
    /// and `Reply-To` is appended last with the raw original `From` value.
    /// The body is carried over untouched.
    pub fn rewrite(&self, message: &EmailMessage) -> TransformResult {
        let original_from = message
            .header_field("From")
            .ok_or(TransformError::MissingFrom)?;

        let mut new_from_raw = vec![b' '];
        new_from_raw.extend(self.rewrite_from(&original_from.unfolded_value()));

        let mut headers = Vec::with_capacity(KEPT_HEADERS.len() + 1);
        let mut from_written = false;

        for header in message.headers() {
            if header.is("From") {
                if !from_written {
                    headers.push(HeaderField::from_raw(header.name(), new_from_raw.clone()));
                    from_written = true;
                }
                continue;
            }
            if KEPT_HEADERS.iter().any(|kept| header.is(kept)) {
                headers.push(header.clone());
            }
        }

        debug!(
            original_from = %original_from.value(),
            new_from = %String::from_utf8_lossy(&new_from_raw).trim(),
            dropped = message.headers().len() - headers.len(),
            "Rewrote envelope"
        );

        headers.push(HeaderField::from_raw(
            "Reply-To",
            original_from.raw_value().to_vec(),
        ));

        Ok(EmailMessage::from_parts(headers, message.body().to_vec()))
    }
}

impl MessageTransformer for EnvelopeRewriter {
    fn transform<'a>(&'a self, message: &'a EmailMessage) -> TransformFuture<'a> {
        Box::pin(async move { self.rewrite(message) })
    }

    fn name(&self) -> &str {
        "envelope"
    }
}
