//! Error types for MIME construction.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME construction error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Header name or value would corrupt the wire format.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Invalid email address in the envelope.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Message has neither a text nor an HTML body.
    #[error("Message must have a text or HTML body")]
    EmptyBody,

    /// Envelope has no recipients.
    #[error("At least one recipient is required")]
    NoRecipients,
}
