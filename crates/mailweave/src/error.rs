//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or incomplete configuration, caught before any network
    /// activity: missing recipients or content, nonexistent file paths,
    /// malformed addresses, unresolvable endpoints.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A value was already recorded in the uniqueness store under the
    /// same namespace.
    #[error("\"{value}\" has already been used as a {namespace}")]
    Duplicate {
        /// The value that was reused.
        value: String,
        /// The namespace it was reused in.
        namespace: String,
    },

    /// Could not reach or converse with a server.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server refused the credentials.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The server rejected a send or draft; the session remains usable.
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Message construction failed.
    #[error("MIME error: {0}")]
    Mime(#[from] mailweave_mime::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
