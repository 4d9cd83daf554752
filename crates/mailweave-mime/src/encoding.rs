//! MIME encoding utilities.
//!
//! Construction-side encoders only: Base64 transfer encoding,
//! Quoted-Printable, and RFC 2047 header encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum line length for encoded bodies (RFC 2045).
const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64 without line breaks.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 wrapped at 76 characters with CRLF breaks,
/// suitable for a message body.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2);
    let mut chars = encoded.as_bytes().chunks(MAX_LINE_LENGTH).peekable();
    while let Some(chunk) = chars.next() {
        // Chunks are always ASCII since Base64 output is ASCII
        result.push_str(&String::from_utf8_lossy(chunk));
        if chars.peek().is_some() {
            result.push_str("\r\n");
        }
    }
    result
}

/// Encodes text using Quoted-Printable encoding (RFC 2045).
///
/// Line breaks in the input (`\n` or `\r\n`) are preserved as hard CRLF
/// breaks; soft breaks keep every output line within 76 characters.
#[must_use]
pub fn encode_quoted_printable(text: &str) -> String {
    let mut result = String::new();
    let mut line_length = 0;

    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];

        // Hard line break: preserve and reset the line counter
        if byte == b'\n' || (byte == b'\r' && bytes.get(i + 1) == Some(&b'\n')) {
            result.push_str("\r\n");
            line_length = 0;
            i += if byte == b'\r' { 2 } else { 1 };
            continue;
        }

        // Soft line break before the line overflows
        if line_length >= MAX_LINE_LENGTH - 3 {
            result.push_str("=\r\n");
            line_length = 0;
        }

        match byte {
            // Printable ASCII except '='
            b'!'..=b'<' | b'>'..=b'~' => {
                result.push(byte as char);
                line_length += 1;
            }
            // Space is literal except when it would end a line
            b' ' => {
                if bytes.get(i + 1).is_none_or(|b| *b == b'\n' || *b == b'\r') {
                    result.push_str("=20");
                    line_length += 3;
                } else {
                    result.push(' ');
                    line_length += 1;
                }
            }
            _ => {
                result.push('=');
                let _ = write!(result, "{byte:02X}");
                line_length += 3;
            }
        }
        i += 1;
    }

    result
}

/// Encodes a header value using RFC 2047 encoded-word form when needed.
///
/// ASCII-clean values pass through unchanged; anything else becomes
/// `=?charset?B?...?=`.
#[must_use]
pub fn encode_rfc2047(text: &str, charset: &str) -> String {
    if text.chars().all(|c| c.is_ascii() && c != '=' && c != '?') {
        return text.to_string();
    }

    let encoded = encode_base64(text.as_bytes());
    format!("=?{charset}?B?{encoded}?=")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base64_encode() {
        assert_eq!(encode_base64(b"Hello, World!"), "SGVsbG8sIFdvcmxkIQ==");
    }

    #[test]
    fn test_base64_wrapped_line_length() {
        let data = vec![0xAB_u8; 300];
        let encoded = encode_base64_wrapped(&data);
        for line in encoded.split("\r\n") {
            assert!(line.len() <= MAX_LINE_LENGTH);
            assert!(!line.is_empty());
        }
    }

    #[test]
    fn test_quoted_printable_ascii_passthrough() {
        assert_eq!(encode_quoted_printable("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_quoted_printable_non_ascii() {
        let encoded = encode_quoted_printable("Héllo, Wørld!");
        assert!(encoded.contains("=C3"));
    }

    #[test]
    fn test_quoted_printable_preserves_line_breaks() {
        let encoded = encode_quoted_printable("line one\nline two");
        assert_eq!(encoded, "line one\r\nline two");
    }

    #[test]
    fn test_quoted_printable_trailing_space_encoded() {
        let encoded = encode_quoted_printable("trailing \nnext");
        assert_eq!(encoded, "trailing=20\r\nnext");
    }

    #[test]
    fn test_rfc2047_ascii_passthrough() {
        assert_eq!(encode_rfc2047("Hello", "utf-8"), "Hello");
    }

    #[test]
    fn test_rfc2047_encodes_non_ascii() {
        let encoded = encode_rfc2047("Héllo", "utf-8");
        assert!(encoded.starts_with("=?utf-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    proptest! {
        #[test]
        fn quoted_printable_lines_fit(text in ".*") {
            let encoded = encode_quoted_printable(&text);
            for line in encoded.split("\r\n") {
                prop_assert!(line.len() <= MAX_LINE_LENGTH);
            }
        }

        #[test]
        fn quoted_printable_is_ascii(text in ".*") {
            let encoded = encode_quoted_printable(&text);
            prop_assert!(encoded.is_ascii());
        }
    }
}
