//! SMTP reply parsing and classification.

use crate::error::{Error, Result};

/// SMTP reply from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code (e.g., 250).
    pub code: ReplyCode,
    /// Reply message lines.
    pub message: Vec<String>,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    pub fn new(code: ReplyCode, message: Vec<String>) -> Self {
        Self { code, message }
    }

    /// Parses a complete reply from its collected lines.
    ///
    /// Replies are single-line (`250 OK`) or multi-line, where every
    /// line but the last uses `-` after the code (`250-STARTTLS`).
    ///
    /// # Errors
    ///
    /// Returns an error if the reply is empty or a line is malformed.
    pub fn parse(lines: &[String]) -> Result<Self> {
        let first = lines
            .first()
            .ok_or_else(|| Error::Protocol("empty reply".into()))?;
        let code = first
            .get(0..3)
            .and_then(|s| s.parse::<u16>().ok())
            .ok_or_else(|| Error::Protocol(format!("malformed reply line: {first}")))?;

        let mut message = Vec::with_capacity(lines.len());
        for line in lines {
            if line.len() == 3 {
                message.push(String::new());
            } else {
                // get() also rejects a separator byte spliced into a
                // multibyte character
                let text = line
                    .get(4..)
                    .ok_or_else(|| Error::Protocol(format!("malformed reply line: {line}")))?;
                message.push(text.to_string());
            }
        }

        Ok(Self::new(ReplyCode::new(code), message))
    }

    /// Returns true if this line terminates a reply (space separator
    /// after the code instead of `-`).
    #[must_use]
    pub fn is_final_line(line: &str) -> bool {
        (line.len() >= 4 && line.as_bytes()[3] == b' ') || line.len() == 3
    }

    /// Returns true if this is a success reply (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Returns the full message as a single string.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.join("\n")
    }
}

/// Numeric SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if this is an intermediate code (3xx).
    #[must_use]
    pub const fn is_intermediate(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Codes the client checks for explicitly
impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);
    /// 535 Authentication credentials invalid
    pub const AUTH_FAILED: Self = Self(535);
    /// 550 Mailbox unavailable
    pub const MAILBOX_UNAVAILABLE: Self = Self(550);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line() {
        let reply = Reply::parse(&["250 OK".to_string()]).unwrap();
        assert_eq!(reply.code, ReplyCode::OK);
        assert_eq!(reply.message, vec!["OK"]);
        assert!(reply.is_success());
    }

    #[test]
    fn test_parse_multi_line() {
        let lines = vec![
            "250-smtp.example.com".to_string(),
            "250-STARTTLS".to_string(),
            "250 AUTH PLAIN LOGIN".to_string(),
        ];
        let reply = Reply::parse(&lines).unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(reply.message.len(), 3);
        assert_eq!(reply.message[1], "STARTTLS");
    }

    #[test]
    fn test_parse_bare_code() {
        let reply = Reply::parse(&["250".to_string()]).unwrap();
        assert_eq!(reply.message, vec![String::new()]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Reply::parse(&[]).is_err());
        assert!(Reply::parse(&["25".to_string()]).is_err());
        assert!(Reply::parse(&["ABC OK".to_string()]).is_err());
    }

    #[test]
    fn test_parse_rejects_multibyte_across_separator() {
        // é spans bytes 3..5, so byte 4 is not a char boundary
        assert!(Reply::parse(&["250é".to_string()]).is_err());
        assert!(Reply::parse(&["250-ok".to_string(), "250é".to_string()]).is_err());
    }

    #[test]
    fn test_is_final_line() {
        assert!(Reply::is_final_line("250 OK"));
        assert!(Reply::is_final_line("250"));
        assert!(!Reply::is_final_line("250-Continuing"));
    }

    #[test]
    fn test_code_classes() {
        assert!(ReplyCode::OK.is_success());
        assert!(ReplyCode::START_DATA.is_intermediate());
        assert!(ReplyCode::new(451).is_transient());
        assert!(ReplyCode::AUTH_FAILED.is_permanent());
        assert!(ReplyCode::MAILBOX_UNAVAILABLE.is_permanent());
    }

    #[test]
    fn test_message_text() {
        let reply = Reply::new(
            ReplyCode::SERVICE_READY,
            vec!["one".to_string(), "two".to_string()],
        );
        assert_eq!(reply.message_text(), "one\ntwo");
    }
}
