//! Core email message type used throughout the forwarding pipeline.
//!
//! This module defines [`EmailMessage`], the parsed representation of an
//! email with structured [RFC 5322](https://www.rfc-editor.org/rfc/rfc5322)
//! headers, an opaque body and a cached serialization ready to be handed
//! to a [`MessageSender`](crate::MessageSender).

use crate::{parse_raw_headers, HeaderField};

/// Represents a parsed email message.
///
/// Headers are stored as an ordered `Vec` of [`HeaderField`] (preserving
/// RFC 5322 order, duplicates such as `Received` and the raw bytes of each
/// value, folding included). The body is kept as
/// raw bytes and never interpreted. A cached `raw` field holds the full
/// serialized form, messages are never mutated in place, transformations
/// build a new message through [`from_parts`](Self::from_parts) instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Ordered list of MIME headers.
    headers: Vec<HeaderField>,

    /// Message body after the blank-line separator (RFC 5322 body).
    body: Vec<u8>,

    /// Cached full serialization (headers + blank line + body).
    raw: Vec<u8>,
}

impl EmailMessage {
    /// Parses a raw internet message, the raw bytes are kept as the
    /// serialized form.
    pub fn parse(raw: &[u8]) -> Self {
        let (headers, body) = parse_raw_headers(raw);
        Self {
            headers,
            body: body.to_vec(),
            raw: raw.to_vec(),
        }
    }

    /// Builds a message from an ordered header list and a body,
    /// serializing it right away.
    pub fn from_parts(headers: Vec<HeaderField>, body: Vec<u8>) -> Self {
        let raw = serialize(&headers, &body);
        Self { headers, body, raw }
    }

    /// Returns the first header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.is(name))
            .map(HeaderField::value)
    }

    /// Returns the first header field matching `name` (case-insensitive).
    pub fn header_field(&self, name: &str) -> Option<&HeaderField> {
        self.headers.iter().find(|h| h.is(name))
    }

    /// Returns the email subject (convenience for `header("Subject")`).
    pub fn subject(&self) -> &str {
        self.header("Subject").unwrap_or_default()
    }

    /// Returns the full serialized email (headers + blank line + content).
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Consumes the message, returning its serialized form.
    pub fn into_raw(self) -> Vec<u8> {
        self.raw
    }

    /// Returns the message body after the header section (RFC 5322 body).
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns whether the message has any MIME headers.
    pub fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }

    /// Returns a reference to the ordered header list.
    pub fn headers(&self) -> &[HeaderField] {
        &self.headers
    }
}

/// Serializes headers and body into wire format.
///
/// Pre-computes the exact byte length, allocates once, and writes all
/// parts in order. Header values are written from their raw bytes, so
/// carried-over headers keep their original folding and encoding. A
/// message without headers serializes to its body.
fn serialize(headers: &[HeaderField], body: &[u8]) -> Vec<u8> {
    let headers_len: usize = headers.iter().map(HeaderField::wire_len).sum();
    let capacity = headers_len + if headers.is_empty() { 0 } else { 2 } + body.len();

    let mut raw = Vec::with_capacity(capacity);

    for header in headers {
        header.write_to(&mut raw);
    }

    if !headers.is_empty() {
        raw.extend_from_slice(b"\r\n");
    }

    raw.extend_from_slice(body);
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_message_parse() {
        let message = EmailMessage::parse(b"Subject: Hello\r\nFrom: a@x.com\r\n\r\nBody text");

        assert_eq!(message.subject(), "Hello");
        assert_eq!(message.header("From"), Some("a@x.com"));
        assert_eq!(message.body(), b"Body text");
        assert_eq!(message.raw(), b"Subject: Hello\r\nFrom: a@x.com\r\n\r\nBody text");
    }

    #[test]
    fn test_email_message_header_case_insensitive() {
        let message = EmailMessage::parse(b"content-type: text/plain\r\n\r\nBody");

        assert_eq!(message.header("Content-Type"), Some("text/plain"));
        assert_eq!(message.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(message.header("From"), None);
    }

    #[test]
    fn test_email_message_no_headers() {
        let message = EmailMessage::parse(b"Plain text body");

        assert!(!message.has_headers());
        assert_eq!(message.subject(), "");
        assert_eq!(message.body(), b"Plain text body");
    }

    #[test]
    fn test_email_message_from_parts() {
        let message = EmailMessage::from_parts(
            vec![
                HeaderField::new("From", "a@x.com"),
                HeaderField::new("Subject", "Hi"),
            ],
            b"Body".to_vec(),
        );

        assert_eq!(message.raw(), b"From: a@x.com\r\nSubject: Hi\r\n\r\nBody");
        assert_eq!(message.headers().len(), 2);
    }

    #[test]
    fn test_email_message_from_parts_without_headers() {
        let message = EmailMessage::from_parts(Vec::new(), b"Only body".to_vec());

        assert_eq!(message.raw(), b"Only body");
    }

    #[test]
    fn test_email_message_reserialize_keeps_folding() {
        let parsed = EmailMessage::parse(b"Subject: Long\r\n subject\r\n\r\nBody");
        let rebuilt = EmailMessage::from_parts(parsed.headers().to_vec(), parsed.body().to_vec());

        assert_eq!(parsed.subject(), "Long subject");
        assert_eq!(rebuilt.into_raw(), b"Subject: Long\r\n subject\r\n\r\nBody".to_vec());
    }

    #[test]
    fn test_email_message_reserialize_keeps_8bit_headers() {
        let raw = b"Subject: Caf\xe9\r\nTo:b@y.com\r\n\r\nBody";
        let parsed = EmailMessage::parse(raw);
        let rebuilt = EmailMessage::from_parts(parsed.headers().to_vec(), parsed.body().to_vec());

        assert_eq!(rebuilt.raw(), raw);
    }

    #[test]
    fn test_email_message_headers_accessor() {
        let message = EmailMessage::parse(b"From: a@b.com\r\nTo: c@d.com\r\n\r\nBody");

        assert_eq!(message.headers().len(), 2);
        assert_eq!(message.headers()[0].name(), "From");
        assert_eq!(message.headers()[1].name(), "To");
        assert_eq!(message.header_field("to").map(HeaderField::raw_value), Some(&b" c@d.com"[..]));
    }
}
