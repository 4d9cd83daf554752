//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
use base64::Engine;
use std::collections::HashSet;
use std::marker::PhantomData;

/// Type-state marker: greeting read, session not yet set up.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker: session established, ready to submit messages.
#[derive(Debug)]
pub struct Ready;

/// SMTP client with compile-time session state.
///
/// A [`Connected`] client performs session setup (EHLO, STARTTLS, AUTH)
/// and becomes [`Ready`]. A [`Ready`] client submits any number of
/// messages over the same connection; a rejected transaction is rolled
/// back with RSET so the session stays usable.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

impl<S> Client<S> {
    /// Returns the server information gathered so far.
    #[must_use]
    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    async fn send_command(&mut self, cmd: &Command) -> Result<Reply> {
        tracing::debug!(command = cmd.keyword(), "sending SMTP command");
        self.stream.write_all(&cmd.serialize()).await?;
        let reply = read_reply(&mut self.stream).await?;
        tracing::debug!(code = reply.code.as_u16(), "server replied");
        Ok(reply)
    }

    /// Sends QUIT and drops the connection, valid in any state.
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT exchange fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(&Command::Quit).await?;
        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(Error::server_reply(reply.code.as_u16(), reply.message_text()));
        }
        Ok(())
    }
}

impl Client<Connected> {
    /// Creates a client from a freshly opened stream and reads the
    /// server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be read or is not a 220.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = read_reply(&mut stream).await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(Error::server_reply(
                greeting.code.as_u16(),
                greeting.message_text(),
            ));
        }

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                extensions: HashSet::new(),
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the greeting.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let cmd = Command::Ehlo {
            hostname: client_hostname.to_string(),
        };
        let reply = self.send_command(&cmd).await?;
        if !reply.is_success() {
            return Err(Error::server_reply(reply.code.as_u16(), reply.message_text()));
        }

        self.server_info.extensions = parse_extensions(&reply);
        Ok(self)
    }

    /// Upgrades the connection with STARTTLS and repeats EHLO on the
    /// encrypted stream.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not advertised or the upgrade
    /// fails.
    pub async fn starttls(mut self, hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        let reply = self.send_command(&Command::StartTls).await?;
        if !reply.is_success() {
            return Err(Error::server_reply(reply.code.as_u16(), reply.message_text()));
        }

        self.stream = self.stream.upgrade_to_tls(hostname).await?;

        // Capabilities must be rediscovered on the encrypted channel
        let cmd = Command::Ehlo {
            hostname: hostname.to_string(),
        };
        let reply = self.send_command(&cmd).await?;
        if !reply.is_success() {
            return Err(Error::server_reply(reply.code.as_u16(), reply.message_text()));
        }
        self.server_info.extensions = parse_extensions(&reply);

        Ok(self)
    }

    /// Authenticates with AUTH PLAIN and moves the session to
    /// [`Ready`].
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the credentials.
    pub async fn auth_plain(mut self, username: &str, password: &str) -> Result<Client<Ready>> {
        let credentials = format!("\0{username}\0{password}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());

        let cmd = Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: encoded,
        };
        let reply = self.send_command(&cmd).await?;
        if !reply.is_success() {
            return Err(Error::server_reply(reply.code.as_u16(), reply.message_text()));
        }

        Ok(Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        })
    }
}

impl Client<Ready> {
    /// Submits one message: MAIL FROM, RCPT TO for each recipient,
    /// DATA, then the dot-stuffed message body.
    ///
    /// Line endings in the message are normalized to CRLF and the
    /// terminating `.` line is added. If the server rejects any step of
    /// the transaction, the transaction is rolled back with RSET and the
    /// session remains usable for further submissions.
    ///
    /// # Errors
    ///
    /// Returns an error if any command is rejected or the connection
    /// fails.
    pub async fn send_mail(
        &mut self,
        from: &Address,
        recipients: &[Address],
        message: &[u8],
    ) -> Result<Reply> {
        if recipients.is_empty() {
            return Err(Error::Protocol("no envelope recipients".into()));
        }

        let cmd = Command::MailFrom { from: from.clone() };
        let reply = self.send_command(&cmd).await?;
        if !reply.is_success() {
            return Err(self.rollback(reply).await);
        }

        for recipient in recipients {
            let cmd = Command::RcptTo {
                to: recipient.clone(),
            };
            let reply = self.send_command(&cmd).await?;
            if !reply.is_success() {
                return Err(self.rollback(reply).await);
            }
        }

        let reply = self.send_command(&Command::Data).await?;
        if reply.code != ReplyCode::START_DATA {
            return Err(self.rollback(reply).await);
        }

        self.write_dot_stuffed(message).await?;

        let reply = read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            // The failed DATA exchange already ended the transaction
            return Err(Error::server_reply(reply.code.as_u16(), reply.message_text()));
        }

        tracing::debug!(code = reply.code.as_u16(), "message accepted");
        Ok(reply)
    }

    /// Rolls back a rejected transaction with RSET, then converts the
    /// rejecting reply into an error.
    async fn rollback(&mut self, rejection: Reply) -> Error {
        if let Err(err) = self.send_command(&Command::Rset).await {
            tracing::warn!(error = %err, "RSET after rejected transaction failed");
        }
        Error::server_reply(rejection.code.as_u16(), rejection.message_text())
    }

    /// Streams the message body with CRLF normalization and
    /// byte-stuffing of leading dots, followed by the terminator line.
    async fn write_dot_stuffed(&mut self, message: &[u8]) -> Result<()> {
        for line in message.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);

            if line.first() == Some(&b'.') {
                self.stream.write_all(b".").await?;
            }
            self.stream.write_all(line).await?;
            self.stream.write_all(b"\r\n").await?;
        }

        self.stream.write_all(b".\r\n").await?;
        Ok(())
    }
}

/// Reads reply lines until the final line of a (possibly multi-line)
/// reply, then parses them.
async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        if line.is_empty() {
            continue;
        }

        let is_final = Reply::is_final_line(&line);
        lines.push(line);
        if is_final {
            break;
        }
    }

    Reply::parse(&lines)
}

fn parse_extensions(reply: &Reply) -> HashSet<Extension> {
    // First line of the EHLO reply is the server greeting, not an
    // extension
    reply
        .message
        .iter()
        .skip(1)
        .map(|line| Extension::parse(line))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extensions_skips_greeting() {
        let reply = Reply::parse(&[
            "250-smtp.example.com at your service".to_string(),
            "250-STARTTLS".to_string(),
            "250 SIZE 35882577".to_string(),
        ])
        .unwrap();

        let extensions = parse_extensions(&reply);
        assert!(extensions.contains(&Extension::StartTls));
        assert!(extensions.contains(&Extension::Size(Some(35_882_577))));
        assert_eq!(extensions.len(), 2);
    }
}
