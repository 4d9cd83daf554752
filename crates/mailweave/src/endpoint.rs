//! Server endpoint configuration and well-known provider defaults.

use serde::{Deserialize, Serialize};

/// Security/encryption mode for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

/// SMTP submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpEndpoint {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
}

impl SmtpEndpoint {
    /// Creates an endpoint with the default port for the security mode.
    #[must_use]
    pub fn new(host: impl Into<String>, security: Security) -> Self {
        Self {
            host: host.into(),
            port: Self::default_port(security),
            security,
        }
    }

    /// Default submission port for the security mode.
    #[must_use]
    pub const fn default_port(security: Security) -> u16 {
        match security {
            Security::None => 25,
            Security::StartTls => 587,
            Security::Tls => 465,
        }
    }
}

/// IMAP endpoint; draft storage always uses implicit TLS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImapEndpoint {
    /// Server hostname.
    pub host: String,
    /// Server port (993 by default).
    pub port: u16,
}

impl ImapEndpoint {
    /// Creates an endpoint on the standard TLS port.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 993,
        }
    }
}

/// Guesses both endpoints from the domain of an email address.
///
/// Covers the common providers; anything else returns `None` and the
/// caller must configure hosts explicitly.
#[must_use]
pub fn guess_from_address(email: &str) -> Option<(SmtpEndpoint, ImapEndpoint)> {
    let domain = email.split('@').nth(1)?;
    match domain.to_lowercase().as_str() {
        "gmail.com" | "googlemail.com" => Some((
            SmtpEndpoint::new("smtp.gmail.com", Security::Tls),
            ImapEndpoint::new("imap.gmail.com"),
        )),
        "outlook.com" | "hotmail.com" | "live.com" => Some((
            SmtpEndpoint::new("smtp.office365.com", Security::StartTls),
            ImapEndpoint::new("outlook.office365.com"),
        )),
        "yahoo.com" | "ymail.com" => Some((
            SmtpEndpoint::new("smtp.mail.yahoo.com", Security::Tls),
            ImapEndpoint::new("imap.mail.yahoo.com"),
        )),
        "icloud.com" | "me.com" | "mac.com" => Some((
            SmtpEndpoint::new("smtp.mail.me.com", Security::StartTls),
            ImapEndpoint::new("imap.mail.me.com"),
        )),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_gmail_defaults() {
        let (smtp, imap) = guess_from_address("user@gmail.com").unwrap();
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.security, Security::Tls);
        assert_eq!(imap.host, "imap.gmail.com");
        assert_eq!(imap.port, 993);
    }

    #[test]
    fn test_outlook_uses_starttls() {
        let (smtp, _) = guess_from_address("user@outlook.com").unwrap();
        assert_eq!(smtp.host, "smtp.office365.com");
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.security, Security::StartTls);
    }

    #[test]
    fn test_unknown_domain_requires_explicit_config() {
        assert!(guess_from_address("user@example.com").is_none());
        assert!(guess_from_address("no-at-sign").is_none());
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(SmtpEndpoint::default_port(Security::None), 25);
        assert_eq!(SmtpEndpoint::default_port(Security::StartTls), 587);
        assert_eq!(SmtpEndpoint::default_port(Security::Tls), 465);
    }
}
