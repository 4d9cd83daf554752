//! Delivery session over the SMTP and IMAP transports.

use crate::endpoint::{ImapEndpoint, Security, SmtpEndpoint, guess_from_address};
use crate::error::{Error, Result};
use crate::sentlog::SentLog;
use mailweave_imap::MailboxInfo;
use mailweave_mime::ComposedMessage;
use mailweave_smtp::{Address, connection as smtp_connection};
use std::path::PathBuf;

/// Configuration for opening a [`DeliverySession`].
///
/// Endpoints default to the sender's provider when the domain is
/// well-known; unknown domains require explicit hosts.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sender email address; also the login username.
    pub address: String,
    /// App password for the account.
    pub password: String,
    /// Explicit SMTP endpoint, overriding provider defaults.
    pub smtp: Option<SmtpEndpoint>,
    /// Explicit IMAP endpoint, overriding provider defaults.
    pub imap: Option<ImapEndpoint>,
    /// Path of the sent log; `None` disables logging of sends.
    pub sent_log: Option<PathBuf>,
    /// Explicit drafts mailbox name, overriding discovery.
    pub drafts_mailbox: Option<String>,
}

impl SessionConfig {
    /// Creates a configuration with provider-guessed endpoints.
    #[must_use]
    pub fn new(address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            password: password.into(),
            smtp: None,
            imap: None,
            sent_log: None,
            drafts_mailbox: None,
        }
    }

    /// Sets an explicit SMTP endpoint.
    #[must_use]
    pub fn smtp_endpoint(mut self, endpoint: SmtpEndpoint) -> Self {
        self.smtp = Some(endpoint);
        self
    }

    /// Sets an explicit IMAP endpoint.
    #[must_use]
    pub fn imap_endpoint(mut self, endpoint: ImapEndpoint) -> Self {
        self.imap = Some(endpoint);
        self
    }

    /// Enables the sent log at the given path.
    #[must_use]
    pub fn sent_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.sent_log = Some(path.into());
        self
    }

    /// Sets the drafts mailbox name, skipping discovery.
    #[must_use]
    pub fn drafts_mailbox(mut self, mailbox: impl Into<String>) -> Self {
        self.drafts_mailbox = Some(mailbox.into());
        self
    }
}

/// Resolves the endpoints to use, preferring explicit configuration
/// over provider defaults.
fn resolve_endpoints(config: &SessionConfig) -> Result<(SmtpEndpoint, ImapEndpoint)> {
    let guessed = guess_from_address(&config.address);
    let smtp = config
        .smtp
        .clone()
        .or_else(|| guessed.clone().map(|(smtp, _)| smtp));
    let imap = config.imap.clone().or_else(|| guessed.map(|(_, imap)| imap));

    match (smtp, imap) {
        (Some(smtp), Some(imap)) => Ok((smtp, imap)),
        _ => Err(Error::Config(format!(
            "no known server defaults for the domain of {}; configure endpoints explicitly",
            config.address
        ))),
    }
}

/// Picks the drafts mailbox from a LIST result: the `\Drafts`
/// special-use attribute wins, then any selectable mailbox whose name
/// contains "draft". Gmail is special-cased by the caller.
fn choose_drafts_mailbox(mailboxes: &[MailboxInfo]) -> Option<String> {
    mailboxes
        .iter()
        .find(|mb| mb.is_drafts() && mb.is_selectable())
        .or_else(|| {
            mailboxes
                .iter()
                .find(|mb| mb.is_selectable() && mb.name.to_lowercase().contains("draft"))
        })
        .map(|mb| mb.name.clone())
}

/// A scoped, exclusively owned connection to the mail servers.
///
/// Opened with [`DeliverySession::open`], used for any number of sends
/// and draft filings, and closed once; operations after close fail. The
/// IMAP connection is established lazily on the first draft filing.
/// Server rejections surface as [`Error::Delivery`] and leave the
/// session open and usable.
pub struct DeliverySession {
    address: String,
    password: String,
    smtp: Option<mailweave_smtp::Client<mailweave_smtp::Ready>>,
    imap: Option<mailweave_imap::Client<mailweave_imap::Authenticated>>,
    imap_endpoint: ImapEndpoint,
    drafts_mailbox: Option<String>,
    sent_log: Option<SentLog>,
}

impl DeliverySession {
    /// Opens the session: connects to the SMTP endpoint, negotiates TLS
    /// per the security mode, and authenticates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for unresolvable endpoints,
    /// [`Error::Connection`] when the server cannot be reached, and
    /// [`Error::Authentication`] when it refuses the credentials.
    pub async fn open(config: SessionConfig) -> Result<Self> {
        let (smtp_endpoint, imap_endpoint) = resolve_endpoints(&config)?;

        tracing::info!(
            host = %smtp_endpoint.host,
            port = smtp_endpoint.port,
            "opening delivery session"
        );

        let stream = match smtp_endpoint.security {
            Security::Tls => {
                smtp_connection::connect_tls(&smtp_endpoint.host, smtp_endpoint.port).await
            }
            Security::StartTls | Security::None => {
                smtp_connection::connect(&smtp_endpoint.host, smtp_endpoint.port).await
            }
        }
        .map_err(smtp_setup_error)?;

        let client = mailweave_smtp::Client::from_stream(stream)
            .await
            .map_err(smtp_setup_error)?;
        let client = client.ehlo("localhost").await.map_err(smtp_setup_error)?;
        let client = if smtp_endpoint.security == Security::StartTls {
            client
                .starttls(&smtp_endpoint.host)
                .await
                .map_err(smtp_setup_error)?
        } else {
            client
        };
        let ready = client
            .auth_plain(&config.address, &config.password)
            .await
            .map_err(smtp_setup_error)?;

        Ok(Self {
            address: config.address,
            password: config.password,
            smtp: Some(ready),
            imap: None,
            imap_endpoint,
            drafts_mailbox: config.drafts_mailbox,
            sent_log: config.sent_log.map(SentLog::new),
        })
    }

    /// Sends a composed message over the SMTP connection.
    ///
    /// On success the sent log is appended when configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Delivery`] if the server rejects the message
    /// (session stays open) or [`Error::Connection`] if the connection
    /// fails or the session is closed.
    pub async fn send(&mut self, message: &ComposedMessage) -> Result<()> {
        let client = self
            .smtp
            .as_mut()
            .ok_or_else(|| Error::Connection("session is closed".into()))?;

        let envelope = message.envelope();
        let from = Address::new(envelope.from.clone()).map_err(address_error)?;
        let recipients = envelope
            .recipients()
            .map(Address::new)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(address_error)?;

        client
            .send_mail(&from, &recipients, &message.to_bytes())
            .await
            .map_err(smtp_delivery_error)?;

        tracing::info!(subject = %envelope.subject, "message sent");
        if let Some(log) = &self.sent_log {
            log.record(envelope).await?;
        }
        Ok(())
    }

    /// Files a composed message as a draft via IMAP APPEND, using the
    /// same serialized bytes as [`DeliverySession::send`].
    ///
    /// The IMAP connection is established on first use. The target
    /// mailbox is the configured one, `[Gmail]/Drafts` for Gmail, or
    /// otherwise discovered from the server's mailbox list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Delivery`] if the server refuses the append
    /// (session stays open), [`Error::Connection`]/
    /// [`Error::Authentication`] for connection problems, and
    /// [`Error::Config`] if no drafts mailbox can be determined.
    pub async fn save_as_draft(&mut self, message: &ComposedMessage) -> Result<()> {
        if self.smtp.is_none() {
            return Err(Error::Connection("session is closed".into()));
        }

        if self.imap.is_none() {
            let client = mailweave_imap::Client::connect(
                &self.imap_endpoint.host,
                self.imap_endpoint.port,
            )
            .await
            .map_err(imap_setup_error)?;
            let client = client
                .login(&self.address, &self.password)
                .await
                .map_err(imap_setup_error)?;
            self.imap = Some(client);
        }
        // Checked or assigned just above
        let Some(client) = self.imap.as_mut() else {
            return Err(Error::Connection("session is closed".into()));
        };

        if self.drafts_mailbox.is_none() {
            let mailbox = if self.imap_endpoint.host == "imap.gmail.com" {
                "[Gmail]/Drafts".to_string()
            } else {
                let mailboxes = client.list("", "*").await.map_err(imap_draft_error)?;
                choose_drafts_mailbox(&mailboxes).ok_or_else(|| {
                    Error::Config(
                        "could not determine the drafts mailbox; configure it explicitly".into(),
                    )
                })?
            };
            tracing::debug!(mailbox = %mailbox, "drafts mailbox resolved");
            self.drafts_mailbox = Some(mailbox);
        }
        // Set just above
        let Some(mailbox) = self.drafts_mailbox.as_deref() else {
            return Err(Error::Connection("session is closed".into()));
        };

        client
            .append(mailbox, &message.to_bytes())
            .await
            .map_err(imap_draft_error)?;

        tracing::info!(subject = %message.envelope().subject, "draft created");
        Ok(())
    }

    /// Closes the session, releasing both connections.
    ///
    /// Idempotent; QUIT/LOGOUT failures are logged, not raised.
    pub async fn close(&mut self) {
        if let Some(client) = self.smtp.take() {
            if let Err(err) = client.quit().await {
                tracing::warn!(error = %err, "SMTP QUIT failed on close");
            }
        }
        if let Some(client) = self.imap.take() {
            if let Err(err) = client.logout().await {
                tracing::warn!(error = %err, "IMAP LOGOUT failed on close");
            }
        }
    }
}

fn smtp_setup_error(err: mailweave_smtp::Error) -> Error {
    if err.is_auth_failure() {
        Error::Authentication(err.to_string())
    } else {
        Error::Connection(err.to_string())
    }
}

fn smtp_delivery_error(err: mailweave_smtp::Error) -> Error {
    match err {
        mailweave_smtp::Error::ServerReply { .. } => Error::Delivery(err.to_string()),
        other => Error::Connection(other.to_string()),
    }
}

fn imap_setup_error(err: mailweave_imap::Error) -> Error {
    match err {
        mailweave_imap::Error::No(_) => Error::Authentication(err.to_string()),
        other => Error::Connection(other.to_string()),
    }
}

fn imap_draft_error(err: mailweave_imap::Error) -> Error {
    match err {
        mailweave_imap::Error::No(_) | mailweave_imap::Error::Bad(_) => {
            Error::Delivery(err.to_string())
        }
        other => Error::Connection(other.to_string()),
    }
}

fn address_error(err: mailweave_smtp::Error) -> Error {
    Error::Config(err.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_endpoints_from_provider() {
        let config = SessionConfig::new("user@gmail.com", "pw");
        let (smtp, imap) = resolve_endpoints(&config).unwrap();
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(imap.host, "imap.gmail.com");
    }

    #[test]
    fn test_resolve_endpoints_explicit_override() {
        let config = SessionConfig::new("user@gmail.com", "pw")
            .smtp_endpoint(SmtpEndpoint::new("mail.internal", Security::StartTls));
        let (smtp, imap) = resolve_endpoints(&config).unwrap();
        assert_eq!(smtp.host, "mail.internal");
        assert_eq!(imap.host, "imap.gmail.com");
    }

    #[test]
    fn test_resolve_endpoints_unknown_domain_fails() {
        let config = SessionConfig::new("user@example.org", "pw");
        let err = resolve_endpoints(&config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_choose_drafts_prefers_special_use() {
        let mailboxes = vec![
            MailboxInfo {
                name: "Old Drafts".to_string(),
                attributes: vec![],
            },
            MailboxInfo {
                name: "Entwürfe".to_string(),
                attributes: vec!["\\Drafts".to_string()],
            },
        ];
        assert_eq!(
            choose_drafts_mailbox(&mailboxes),
            Some("Entwürfe".to_string())
        );
    }

    #[test]
    fn test_choose_drafts_falls_back_to_name() {
        let mailboxes = vec![
            MailboxInfo {
                name: "INBOX".to_string(),
                attributes: vec![],
            },
            MailboxInfo {
                name: "Drafts".to_string(),
                attributes: vec![],
            },
        ];
        assert_eq!(choose_drafts_mailbox(&mailboxes), Some("Drafts".to_string()));
    }

    #[test]
    fn test_choose_drafts_skips_noselect() {
        let mailboxes = vec![MailboxInfo {
            name: "[Gmail]/Drafts".to_string(),
            attributes: vec!["\\Noselect".to_string()],
        }];
        assert_eq!(choose_drafts_mailbox(&mailboxes), None);
    }
}
