/// A single header field as found in the header section.
///
/// The raw value (everything after the colon, folding included) is kept
/// byte for byte so that headers carried over unchanged are written back
/// exactly as received, 8-bit bytes and line folding alike. The decoded
/// [`value`](Self::value) is only meant for matching and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    /// Header name, case preserved.
    name: String,

    /// Bytes after the colon, folded lines joined with `\r\n`.
    raw_value: Vec<u8>,

    /// Unfolded, trimmed value decoded lossily as UTF-8.
    value: String,
}

impl HeaderField {
    /// Creates a header from a textual value, written as `Name: value`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut raw_value = Vec::with_capacity(value.len() + 1);
        raw_value.push(b' ');
        raw_value.extend_from_slice(value.as_bytes());
        Self::from_raw(name, raw_value)
    }

    /// Creates a header from its raw value bytes, as they appear after the colon.
    pub fn from_raw(name: impl Into<String>, raw_value: Vec<u8>) -> Self {
        let value = String::from_utf8_lossy(&unfold(&raw_value))
            .trim()
            .to_string();
        Self {
            name: name.into(),
            raw_value,
            value,
        }
    }

    /// Returns the header name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unfolded value, lossily decoded.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the raw value bytes exactly as received.
    pub fn raw_value(&self) -> &[u8] {
        &self.raw_value
    }

    /// Returns the raw value with line folding removed and surrounding
    /// whitespace trimmed, without any decoding.
    pub fn unfolded_value(&self) -> Vec<u8> {
        unfold(&self.raw_value).trim_ascii().to_vec()
    }

    /// Returns whether this header is named `name` (case-insensitive).
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Appends the wire form of the header (`Name:value\r\n`) to `out`.
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.name.as_bytes());
        out.push(b':');
        out.extend_from_slice(&self.raw_value);
        out.extend_from_slice(b"\r\n");
    }

    /// Returns the length of the wire form.
    pub(crate) fn wire_len(&self) -> usize {
        self.name.len() + 1 + self.raw_value.len() + 2
    }
}

/// Removes folding line breaks (RFC 5322 2.2.3), keeping the whitespace
/// that follows them.
fn unfold(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .copied()
        .filter(|&b| b != b'\r' && b != b'\n')
        .collect()
}

/// Checks whether a raw email contains a `MIME-Version:` header,
/// indicating it is a MIME message per RFC 2045.
///
/// Only the header section (lines before the first blank line) is inspected.
/// A `MIME-Version:` header appearing in the content (after the blank
/// line separator) is not considered valid.
///
/// # Examples
///
/// A message with a `MIME-Version` header is valid:
///
/// ```rust
/// assert!(remail_utils::is_mime_valid(
///     b"MIME-Version: 1.0\r\nContent-Type: text/plain\r\n\r\nBody"
/// ));
/// ```
///
/// `MIME-Version` in the body (after the blank line) does not count:
///
/// ```rust
/// assert!(!remail_utils::is_mime_valid(
///     b"Subject: Hello\r\n\r\nMIME-Version: 1.0"
/// ));
/// ```
pub fn is_mime_valid(raw: &[u8]) -> bool {
    let (headers, _) = parse_raw_headers(raw);
    headers.iter().any(|header| header.is("MIME-Version"))
}

/// Parses headers from a raw email, returning an ordered list of headers
/// and a reference to the content after the blank-line separator.
///
/// Headers are preserved in their original order with case-preserved names,
/// supporting duplicate headers (e.g. `Received`). Continuation lines
/// (starting with a space or a tab) stay part of the raw value of the
/// header they fold, joined with `\r\n`.
///
/// Both `\r\n` and bare `\n` line endings are accepted. Header bytes are
/// never altered, the content is returned untouched.
///
/// # Examples
///
/// ```rust
/// let (headers, content) = remail_utils::parse_raw_headers(
///     b"From: alice@example.com\r\nTo: bob@example.com\r\n\r\nHello!"
/// );
/// assert_eq!(headers.len(), 2);
/// assert_eq!(headers[0].name(), "From");
/// assert_eq!(headers[0].value(), "alice@example.com");
/// assert_eq!(content, b"Hello!");
/// ```
pub fn parse_raw_headers(raw: &[u8]) -> (Vec<HeaderField>, &[u8]) {
    let mut fields: Vec<(String, Vec<u8>)> = Vec::new();
    let mut pos = 0;

    while pos < raw.len() {
        let (line, consumed) = next_line(raw, pos);

        if line.trim_ascii().is_empty() {
            pos = consumed;
            break;
        }

        if matches!(line[0], b' ' | b'\t') {
            // Continuation of the previous header, a leading one
            // means there is no header section at all
            match fields.last_mut() {
                Some((_, raw_value)) => {
                    raw_value.extend_from_slice(b"\r\n");
                    raw_value.extend_from_slice(line);
                }
                None => break,
            }
            pos = consumed;
            continue;
        }

        if let Some(colon) = line.iter().position(|&b| b == b':') {
            let name = String::from_utf8_lossy(&line[..colon]).trim().to_string();
            fields.push((name, line[colon + 1..].to_vec()));
        } else {
            // Line is not a header (no colon) and not blank, treat as start of content
            break;
        }

        pos = consumed;
    }

    let headers = fields
        .into_iter()
        .map(|(name, raw_value)| HeaderField::from_raw(name, raw_value))
        .collect();
    (headers, &raw[pos..])
}

/// Returns the line starting at `pos` without its terminator, together
/// with the position right after the terminator.
fn next_line(raw: &[u8], pos: usize) -> (&[u8], usize) {
    match raw[pos..].iter().position(|&b| b == b'\n') {
        Some(offset) => {
            let end = pos + offset;
            let line = &raw[pos..end];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            (line, end + 1)
        }
        None => (&raw[pos..], raw.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(headers: &[HeaderField]) -> Vec<(&str, &str)> {
        headers.iter().map(|h| (h.name(), h.value())).collect()
    }

    #[test]
    fn test_parse_raw_headers_crlf() {
        let (headers, content) =
            parse_raw_headers(b"Subject: Hello\r\nFrom: a@x.com\r\n\r\nBody text");

        assert_eq!(
            pairs(&headers),
            vec![("Subject", "Hello"), ("From", "a@x.com")]
        );
        assert_eq!(headers[0].raw_value(), b" Hello");
        assert_eq!(content, b"Body text");
    }

    #[test]
    fn test_parse_raw_headers_bare_lf() {
        let (headers, content) = parse_raw_headers(b"Subject: Hello\nTo: b@y.com\n\nLine 1\nLine 2");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers[1].value(), "b@y.com");
        assert_eq!(content, b"Line 1\nLine 2");
    }

    #[test]
    fn test_parse_raw_headers_continuation_lines() {
        let (headers, content) = parse_raw_headers(
            b"Subject: A rather long\r\n subject line\r\nReceived: from a\n\tby b\r\n\r\nBody",
        );

        assert_eq!(headers[0].value(), "A rather long subject line");
        assert_eq!(headers[0].raw_value(), b" A rather long\r\n subject line");
        assert_eq!(headers[1].value(), "from a\tby b");
        assert_eq!(headers[1].raw_value(), b" from a\r\n\tby b");
        assert_eq!(content, b"Body");
    }

    #[test]
    fn test_parse_raw_headers_keeps_8bit_values() {
        let (headers, _) = parse_raw_headers(b"Subject: Caf\xe9 cr\xe8me\r\n\r\nBody");

        assert_eq!(headers[0].raw_value(), b" Caf\xe9 cr\xe8me");
        assert_eq!(headers[0].unfolded_value(), b"Caf\xe9 cr\xe8me");
        assert_eq!(headers[0].value(), "Caf\u{fffd} cr\u{fffd}me");
    }

    #[test]
    fn test_parse_raw_headers_keeps_duplicates_in_order() {
        let (headers, _) =
            parse_raw_headers(b"Received: one\r\nReceived: two\r\nSubject: S\r\n\r\n");

        let received: Vec<&str> = headers
            .iter()
            .filter(|h| h.is("received"))
            .map(|h| h.value())
            .collect();
        assert_eq!(received, vec!["one", "two"]);
    }

    #[test]
    fn test_parse_raw_headers_plain_text() {
        let (headers, content) = parse_raw_headers(b"Just plain text");

        assert!(headers.is_empty());
        assert_eq!(content, b"Just plain text");
    }

    #[test]
    fn test_parse_raw_headers_leading_whitespace_is_content() {
        let (headers, content) = parse_raw_headers(b"  indented text\r\nmore");

        assert!(headers.is_empty());
        assert_eq!(content, b"  indented text\r\nmore");
    }

    #[test]
    fn test_parse_raw_headers_without_body() {
        let (headers, content) = parse_raw_headers(b"Subject: Only headers\r\n");

        assert_eq!(headers.len(), 1);
        assert!(content.is_empty());
    }

    #[test]
    fn test_parse_raw_headers_keeps_binary_body() {
        let raw = b"Content-Type: application/octet-stream\r\n\r\n\xff\xfe\x00\x01";
        let (_, content) = parse_raw_headers(raw);

        assert_eq!(content, b"\xff\xfe\x00\x01");
    }

    #[test]
    fn test_header_field_new_wire_form() {
        let header = HeaderField::new("Reply-To", "a@x.com");
        let mut out = Vec::new();
        header.write_to(&mut out);

        assert_eq!(out, b"Reply-To: a@x.com\r\n");
        assert_eq!(out.len(), header.wire_len());
    }

    #[test]
    fn test_is_mime_valid_case_insensitive() {
        assert!(is_mime_valid(b"mime-version: 1.0\r\n\r\nBody"));
        assert!(!is_mime_valid(b"Just plain text"));
    }
}
