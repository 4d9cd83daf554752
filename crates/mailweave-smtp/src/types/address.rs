//! Envelope address type.

use crate::error::{Error, Result};

/// Email address used on the SMTP envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address, validating its basic shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the address has no local part, no domain, or
    /// more than one `@`.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        let mut parts = addr.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(addr))
            }
            _ => Err(Error::InvalidAddress(addr)),
        }
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
