//! Type-state IMAP client.

use crate::error::{Error, Result};
use crate::stream::ImapStream;
use crate::tag::TagGenerator;
use chrono::Local;
use std::marker::PhantomData;

/// Type-state marker: greeting read, not yet logged in.
#[derive(Debug)]
pub struct NotAuthenticated;

/// Type-state marker: logged in.
#[derive(Debug)]
pub struct Authenticated;

/// One mailbox from a LIST response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxInfo {
    /// Mailbox name as reported by the server.
    pub name: String,
    /// Name attributes (e.g., `\Drafts`, `\Noselect`).
    pub attributes: Vec<String>,
}

impl MailboxInfo {
    /// Returns true if the mailbox carries the `\Drafts` special-use
    /// attribute (RFC 6154).
    #[must_use]
    pub fn is_drafts(&self) -> bool {
        self.attributes
            .iter()
            .any(|attr| attr.eq_ignore_ascii_case("\\Drafts"))
    }

    /// Returns true if the mailbox can hold messages.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self
            .attributes
            .iter()
            .any(|attr| attr.eq_ignore_ascii_case("\\Noselect"))
    }
}

/// IMAP client with compile-time session state.
#[derive(Debug)]
pub struct Client<State> {
    stream: ImapStream,
    tags: TagGenerator,
    _state: PhantomData<State>,
}

impl Client<NotAuthenticated> {
    /// Connects over TLS and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the greeting is not
    /// `* OK`.
    pub async fn connect(hostname: &str, port: u16) -> Result<Self> {
        let stream = ImapStream::connect(hostname, port).await?;
        Self::from_stream(stream).await
    }

    /// Creates a client from a connected stream and reads the greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting is a BYE or malformed.
    pub async fn from_stream(mut stream: ImapStream) -> Result<Self> {
        let greeting = stream.read_line().await?;
        tracing::debug!(greeting = %greeting, "IMAP greeting");

        if let Some(text) = greeting.strip_prefix("* BYE") {
            return Err(Error::Bye(text.trim().to_string()));
        }
        if !greeting.starts_with("* OK") && !greeting.starts_with("* PREAUTH") {
            return Err(Error::Protocol(format!("unexpected greeting: {greeting}")));
        }

        Ok(Self {
            stream,
            tags: TagGenerator::new(),
            _state: PhantomData,
        })
    }

    /// Authenticates with LOGIN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::No`] if the server refuses the credentials.
    pub async fn login(mut self, username: &str, password: &str) -> Result<Client<Authenticated>> {
        let tag = self.tags.next_tag();
        let command = format!(
            "{tag} LOGIN {} {}\r\n",
            quote_string(username),
            quote_string(password)
        );
        self.stream.write_all(command.as_bytes()).await?;
        read_until_tagged(&mut self.stream, &tag).await?;

        Ok(Client {
            stream: self.stream,
            tags: self.tags,
            _state: PhantomData,
        })
    }
}

impl Client<Authenticated> {
    /// Lists mailboxes matching the reference and pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<MailboxInfo>> {
        let tag = self.tags.next_tag();
        let command = format!(
            "{tag} LIST {} {}\r\n",
            quote_string(reference),
            quote_string(pattern)
        );
        self.stream.write_all(command.as_bytes()).await?;

        let untagged = read_until_tagged(&mut self.stream, &tag).await?;
        Ok(untagged
            .iter()
            .filter_map(|line| parse_list_line(line))
            .collect())
    }

    /// Appends a complete message to a mailbox with the `\Draft` flag
    /// and the current time as internal date.
    ///
    /// # Errors
    ///
    /// Returns an error if the server refuses the literal or the
    /// append fails.
    pub async fn append(&mut self, mailbox: &str, message: &[u8]) -> Result<()> {
        let tag = self.tags.next_tag();
        let command = format!(
            "{tag} APPEND {} (\\Draft) \"{}\" {{{}}}\r\n",
            quote_string(mailbox),
            internal_date(),
            message.len()
        );
        self.stream.write_all(command.as_bytes()).await?;

        // The server must accept the literal with a continuation
        // request before the message bytes follow
        let line = self.stream.read_line().await?;
        if !line.starts_with('+') {
            // A tagged NO/BAD arrives here when the server refuses the
            // append outright
            complete(&line, &tag)?;
            return Err(Error::Protocol(format!(
                "expected continuation request, got: {line}"
            )));
        }

        self.stream.write_all(message).await?;
        self.stream.write_all(b"\r\n").await?;
        read_until_tagged(&mut self.stream, &tag).await?;

        tracing::debug!(mailbox = %mailbox, bytes = message.len(), "draft appended");
        Ok(())
    }

    /// Sends LOGOUT and drops the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn logout(mut self) -> Result<()> {
        let tag = self.tags.next_tag();
        let command = format!("{tag} LOGOUT\r\n");
        self.stream.write_all(command.as_bytes()).await?;

        // The server answers with an untagged BYE before the tagged OK
        loop {
            let line = self.stream.read_line().await?;
            if line.starts_with(&format!("{tag} ")) {
                return complete(&line, &tag);
            }
        }
    }
}

/// Reads responses until the tagged completion, collecting untagged
/// lines on the way.
async fn read_until_tagged(stream: &mut ImapStream, tag: &str) -> Result<Vec<String>> {
    let mut untagged = Vec::new();
    loop {
        let line = stream.read_line().await?;
        if line.starts_with(&format!("{tag} ")) {
            complete(&line, tag)?;
            return Ok(untagged);
        }
        if let Some(text) = line.strip_prefix("* BYE") {
            return Err(Error::Bye(text.trim().to_string()));
        }
        untagged.push(line);
    }
}

/// Converts a tagged completion line into a result.
fn complete(line: &str, tag: &str) -> Result<()> {
    let rest = line
        .strip_prefix(tag)
        .map(str::trim_start)
        .ok_or_else(|| Error::Protocol(format!("response for wrong tag: {line}")))?;

    if let Some(text) = rest.strip_prefix("OK") {
        tracing::trace!(text = text.trim(), "command completed");
        Ok(())
    } else if let Some(text) = rest.strip_prefix("NO") {
        Err(Error::No(text.trim().to_string()))
    } else if let Some(text) = rest.strip_prefix("BAD") {
        Err(Error::Bad(text.trim().to_string()))
    } else {
        Err(Error::Protocol(format!("malformed completion: {line}")))
    }
}

/// Parses one untagged LIST response line.
///
/// `* LIST (\HasNoChildren \Drafts) "/" "[Gmail]/Drafts"`
fn parse_list_line(line: &str) -> Option<MailboxInfo> {
    let rest = line.strip_prefix("* LIST ")?;

    let attrs_end = rest.find(')')?;
    let attributes = rest
        .get(1..attrs_end)?
        .split_whitespace()
        .map(str::to_string)
        .collect();

    // Skip the hierarchy delimiter (quoted or NIL)
    let rest = rest.get(attrs_end + 1..)?.trim_start();
    let rest = if let Some(after_quote) = rest.strip_prefix('"') {
        after_quote.split_once('"')?.1.trim_start()
    } else {
        rest.split_once(' ')?.1.trim_start()
    };

    let name = if let Some(quoted) = rest.strip_prefix('"') {
        quoted.strip_suffix('"')?.replace("\\\"", "\"")
    } else {
        rest.to_string()
    };

    Some(MailboxInfo { name, attributes })
}

/// Quotes a string per RFC 3501, escaping backslashes and quotes.
fn quote_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Formats the current local time as an IMAP date-time for APPEND.
fn internal_date() -> String {
    Local::now().format("%d-%b-%Y %H:%M:%S %z").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_line_quoted_name() {
        let info = parse_list_line("* LIST (\\HasNoChildren \\Drafts) \"/\" \"[Gmail]/Drafts\"")
            .unwrap();
        assert_eq!(info.name, "[Gmail]/Drafts");
        assert!(info.is_drafts());
        assert!(info.is_selectable());
    }

    #[test]
    fn test_parse_list_line_unquoted_name() {
        let info = parse_list_line("* LIST (\\HasNoChildren) \"/\" INBOX").unwrap();
        assert_eq!(info.name, "INBOX");
        assert!(!info.is_drafts());
    }

    #[test]
    fn test_parse_list_line_noselect() {
        let info = parse_list_line("* LIST (\\Noselect \\HasChildren) \"/\" \"[Gmail]\"").unwrap();
        assert_eq!(info.name, "[Gmail]");
        assert!(!info.is_selectable());
    }

    #[test]
    fn test_parse_list_line_rejects_other_responses() {
        assert!(parse_list_line("* CAPABILITY IMAP4rev1").is_none());
        assert!(parse_list_line("A0001 OK LIST completed").is_none());
    }

    #[test]
    fn test_quote_string_escapes() {
        assert_eq!(quote_string("plain"), "\"plain\"");
        assert_eq!(quote_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote_string("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn test_complete_classifies_results() {
        assert!(complete("A0001 OK done", "A0001").is_ok());
        assert!(matches!(
            complete("A0001 NO [AUTHENTICATIONFAILED] bad", "A0001"),
            Err(Error::No(_))
        ));
        assert!(matches!(
            complete("A0001 BAD syntax", "A0001"),
            Err(Error::Bad(_))
        ));
    }

    #[test]
    fn test_internal_date_shape() {
        let date = internal_date();
        // dd-Mon-yyyy hh:mm:ss +zzzz
        assert_eq!(date.split(' ').count(), 3);
        assert_eq!(date.split('-').count(), 3);
    }
}
