//! Content identifiers for inline message parts.

use std::fmt;
use uuid::Uuid;

/// An opaque token linking an HTML image reference to its binary part
/// within one message.
///
/// Identifiers are minted per inline image per message; two distinct
/// inline images in the same message never share one. The token is owned
/// by the message being composed and has no meaning outside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    /// Mints a fresh identifier.
    #[must_use]
    pub fn mint() -> Self {
        Self(format!("{}@mailweave", Uuid::new_v4().simple()))
    }

    /// Returns the bare identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `cid:` URL used inside HTML markup.
    #[must_use]
    pub fn cid_url(&self) -> String {
        format!("cid:{}", self.0)
    }

    /// Returns the angle-bracketed form used in the Content-ID header.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("<{}>", self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates a unique multipart boundary.
#[must_use]
pub(crate) fn mint_boundary() -> String {
    format!("=_mailweave_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_ids_are_unique() {
        let a = ContentId::mint();
        let b = ContentId::mint();
        assert_ne!(a, b);
    }

    #[test]
    fn test_cid_url_and_header_value_agree() {
        let id = ContentId::mint();
        assert_eq!(id.cid_url(), format!("cid:{}", id.as_str()));
        assert_eq!(id.header_value(), format!("<{}>", id.as_str()));
    }

    #[test]
    fn test_boundaries_are_unique() {
        assert_ne!(mint_boundary(), mint_boundary());
    }
}
