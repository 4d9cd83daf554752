//! Email header construction.

use crate::encoding::encode_rfc2047;
use crate::error::{Error, Result};
use std::fmt;

/// An ordered collection of email headers.
///
/// Insertion order is preserved so the serialized message reads the way
/// it was built (From before To before Subject). Lookups are
/// case-insensitive per RFC 5322.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header, keeping any existing values for the same name.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Sets a header, replacing any existing values for the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries
            .retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.entries.push((name, value.into()));
    }

    /// Gets the first value for a header, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns true if no headers have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encodes a header value for the wire, applying RFC 2047 when the
    /// value is not ASCII-clean.
    ///
    /// # Errors
    ///
    /// Returns an error if the value embeds a line break, which would
    /// allow header injection.
    pub fn encode_value(value: &str) -> Result<String> {
        if value.contains('\r') || value.contains('\n') {
            return Err(Error::InvalidHeader(format!(
                "header value contains a line break: {value:?}"
            )));
        }
        Ok(encode_rfc2047(value, "utf-8"))
    }

    /// Writes the headers to a buffer with CRLF line endings.
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        for (name, value) in &self.entries {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn test_set_replaces_all_values() {
        let mut headers = Headers::new();
        headers.add("To", "alice@example.com");
        headers.add("To", "bob@example.com");
        headers.set("To", "charlie@example.com");

        let values: Vec<_> = headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("to"))
            .collect();
        assert_eq!(values, vec![("To", "charlie@example.com")]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut headers = Headers::new();
        headers.add("From", "a@example.com");
        headers.add("To", "b@example.com");
        headers.add("Subject", "Test");

        let names: Vec<_> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["From", "To", "Subject"]);
    }

    #[test]
    fn test_encode_value_ascii() {
        assert_eq!(Headers::encode_value("Quarterly report").unwrap(), "Quarterly report");
    }

    #[test]
    fn test_encode_value_non_ascii() {
        let encoded = Headers::encode_value("Héllo").unwrap();
        assert!(encoded.starts_with("=?utf-8?B?"));
    }

    #[test]
    fn test_encode_value_rejects_line_break() {
        assert!(Headers::encode_value("evil\r\nBcc: x@example.com").is_err());
    }

    #[test]
    fn test_write_to_uses_crlf() {
        let mut headers = Headers::new();
        headers.add("Subject", "Test");
        let mut out = Vec::new();
        headers.write_to(&mut out);
        assert_eq!(out, b"Subject: Test\r\n");
    }
}
