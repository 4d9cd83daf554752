//! Error types for IMAP operations.

use std::io;

/// Result type alias for IMAP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// IMAP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Server completed the command with NO.
    #[error("server refused command: {0}")]
    No(String),

    /// Server rejected the command with BAD.
    #[error("server rejected command: {0}")]
    Bad(String),

    /// Server closed the connection with BYE.
    #[error("server closed connection: {0}")]
    Bye(String),

    /// Protocol error (malformed or unexpected response).
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Returns true if the server refused LOGIN credentials.
    ///
    /// Servers answer a failed LOGIN with NO, so a NO completion of
    /// LOGIN is an authentication failure.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::No(_))
    }
}
