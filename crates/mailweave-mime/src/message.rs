//! Message part tree and RFC 5322 serialization.

use crate::content_id::{ContentId, mint_boundary};
use crate::content_type::ContentType;
use crate::encoding::{encode_base64_wrapped, encode_quoted_printable};
use crate::error::{Error, Result};
use crate::header::Headers;
use chrono::Utc;
use std::fmt;
use uuid::Uuid;

/// Transfer encoding applied to a part body at serialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// Quoted-Printable encoding, for text bodies.
    QuotedPrintable,
    /// Base64 encoding, for binary bodies.
    Base64,
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Base64 => write!(f, "base64"),
        }
    }
}

/// A single leaf part of a message: headers plus a raw body.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers (Content-Type, Content-Disposition, ...).
    pub headers: Headers,
    /// Raw, unencoded body bytes.
    pub body: Vec<u8>,
    /// Transfer encoding applied when the message is serialized.
    pub encoding: TransferEncoding,
}

impl Part {
    /// Creates a text/plain part.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.add("Content-Type", ContentType::text_plain().to_string());
        Self {
            headers,
            body: content.into().into_bytes(),
            encoding: TransferEncoding::QuotedPrintable,
        }
    }

    /// Creates a text/html part.
    #[must_use]
    pub fn html(content: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.add("Content-Type", ContentType::text_html().to_string());
        Self {
            headers,
            body: content.into().into_bytes(),
            encoding: TransferEncoding::QuotedPrintable,
        }
    }

    /// Creates a downloadable attachment part.
    #[must_use]
    pub fn attachment(content_type: &ContentType, filename: &str, body: Vec<u8>) -> Self {
        let mut headers = Headers::new();
        let ct = content_type.clone().with_parameter("name", filename);
        headers.add("Content-Type", ct.to_string());
        headers.add(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        );
        Self {
            headers,
            body,
            encoding: TransferEncoding::Base64,
        }
    }

    /// Returns the body as a string (valid for text parts).
    #[must_use]
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A binary part referenced from inside the HTML body via a content
/// identifier, rendered in place by the mail client.
#[derive(Debug, Clone)]
pub struct InlinePart {
    /// The underlying part.
    pub part: Part,
    /// The identifier cross-linking this part to the HTML markup.
    pub content_id: ContentId,
}

impl InlinePart {
    /// Creates an inline part tagged with a content identifier.
    #[must_use]
    pub fn new(
        content_type: &ContentType,
        filename: &str,
        body: Vec<u8>,
        content_id: ContentId,
    ) -> Self {
        let mut headers = Headers::new();
        let ct = content_type.clone().with_parameter("name", filename);
        headers.add("Content-Type", ct.to_string());
        headers.add("Content-ID", content_id.header_value());
        headers.add(
            "Content-Disposition",
            format!("inline; filename=\"{filename}\""),
        );
        Self {
            part: Part {
                headers,
                body,
                encoding: TransferEncoding::Base64,
            },
            content_id,
        }
    }
}

/// The HTML alternative together with its nested inline parts.
#[derive(Debug, Clone)]
pub struct HtmlBody {
    /// The text/html part.
    pub part: Part,
    /// Inline image parts, children of the HTML alternative.
    pub inline: Vec<InlinePart>,
}

impl HtmlBody {
    /// Creates an HTML body with no inline parts.
    #[must_use]
    pub fn new(part: Part) -> Self {
        Self {
            part,
            inline: Vec::new(),
        }
    }

    /// Attaches inline image parts.
    #[must_use]
    pub fn with_inline(mut self, inline: Vec<InlinePart>) -> Self {
        self.inline = inline;
        self
    }
}

/// Addressing and subject for one message.
///
/// Bcc recipients are carried in the envelope only; they never appear in
/// the serialized headers.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Sender address.
    pub from: String,
    /// Primary recipients.
    pub to: Vec<String>,
    /// Carbon-copy recipients.
    pub cc: Vec<String>,
    /// Blind-carbon-copy recipients.
    pub bcc: Vec<String>,
    /// Subject line; may be empty.
    pub subject: String,
}

impl Envelope {
    /// Creates a new envelope with a sender and subject.
    #[must_use]
    pub fn new(from: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: subject.into(),
        }
    }

    /// Adds a primary recipient.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Adds a carbon-copy recipient.
    #[must_use]
    pub fn cc(mut self, recipient: impl Into<String>) -> Self {
        self.cc.push(recipient.into());
        self
    }

    /// Adds a blind-carbon-copy recipient.
    #[must_use]
    pub fn bcc(mut self, recipient: impl Into<String>) -> Self {
        self.bcc.push(recipient.into());
        self
    }

    /// Returns all recipients across to, cc and bcc in order.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(self.cc.iter())
            .chain(self.bcc.iter())
            .map(String::as_str)
    }
}

/// Basic structural validation of an email address.
fn validate_address(addr: &str) -> Result<()> {
    let mut parts = addr.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(Error::InvalidAddress(addr.to_string())),
    }
}

/// Builder for a [`ComposedMessage`].
#[derive(Debug)]
pub struct MessageBuilder {
    envelope: Envelope,
    text: Option<Part>,
    html: Option<HtmlBody>,
    attachments: Vec<Part>,
}

impl MessageBuilder {
    /// Sets the plaintext alternative.
    #[must_use]
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.text = Some(Part::text(content));
        self
    }

    /// Sets the HTML alternative.
    #[must_use]
    pub fn html(mut self, html: HtmlBody) -> Self {
        self.html = Some(html);
        self
    }

    /// Appends an attachment part.
    #[must_use]
    pub fn attach(mut self, part: Part) -> Self {
        self.attachments.push(part);
        self
    }

    /// Validates the structure and produces the immutable message.
    ///
    /// # Errors
    ///
    /// Returns an error if no body is present, no recipient is given, an
    /// address is malformed, or the subject would corrupt the headers.
    pub fn finish(self) -> Result<ComposedMessage> {
        if self.text.is_none() && self.html.is_none() {
            return Err(Error::EmptyBody);
        }
        if self.envelope.recipients().next().is_none() {
            return Err(Error::NoRecipients);
        }
        validate_address(&self.envelope.from)?;
        for addr in self.envelope.recipients() {
            validate_address(addr)?;
        }

        let mut headers = Headers::new();
        headers.add("From", self.envelope.from.clone());
        if !self.envelope.to.is_empty() {
            headers.add("To", self.envelope.to.join(", "));
        }
        if !self.envelope.cc.is_empty() {
            headers.add("Cc", self.envelope.cc.join(", "));
        }
        headers.add("Subject", Headers::encode_value(&self.envelope.subject)?);
        headers.add("Date", Utc::now().to_rfc2822());
        headers.add(
            "Message-ID",
            format!("<{}@mailweave>", Uuid::new_v4().simple()),
        );
        headers.add("MIME-Version", "1.0");

        Ok(ComposedMessage {
            envelope: self.envelope,
            headers,
            text: self.text,
            html: self.html,
            attachments: self.attachments,
        })
    }
}

/// The final immutable message artifact.
///
/// Carries headers, the body part tree and the envelope; transport
/// agnostic, no connection state. Ordering invariants: the plaintext
/// alternative precedes the HTML alternative, inline parts are children
/// of the HTML alternative, attachments follow the body.
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    envelope: Envelope,
    headers: Headers,
    text: Option<Part>,
    html: Option<HtmlBody>,
    attachments: Vec<Part>,
}

impl ComposedMessage {
    /// Starts building a message for the given envelope.
    #[must_use]
    pub fn build(envelope: Envelope) -> MessageBuilder {
        MessageBuilder {
            envelope,
            text: None,
            html: None,
            attachments: Vec::new(),
        }
    }

    /// Returns the envelope.
    #[must_use]
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Returns the message headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the plaintext part, if any.
    #[must_use]
    pub fn text_part(&self) -> Option<&Part> {
        self.text.as_ref()
    }

    /// Returns the HTML alternative, if any.
    #[must_use]
    pub fn html_body(&self) -> Option<&HtmlBody> {
        self.html.as_ref()
    }

    /// Returns the attachment parts.
    #[must_use]
    pub fn attachments(&self) -> &[Part] {
        &self.attachments
    }

    /// Serializes the message to RFC 5322 wire bytes with CRLF line
    /// endings.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.headers.write_to(&mut out);
        write_entity(&mut out, &self.root_entity());
        out
    }

    /// Builds the serialization tree:
    /// mixed(alternative(text, related(html, inline...)), attachments...)
    /// with each container elided when it would have a single child.
    fn root_entity(&self) -> Entity<'_> {
        let html_entity = self.html.as_ref().map(|html| {
            if html.inline.is_empty() {
                Entity::Single(&html.part)
            } else {
                let mut children = vec![Entity::Single(&html.part)];
                children.extend(html.inline.iter().map(|p| Entity::Single(&p.part)));
                Entity::container(ContentType::multipart_related(mint_boundary()), children)
            }
        });

        let body = match (&self.text, html_entity) {
            (Some(text), Some(html)) => Entity::container(
                ContentType::multipart_alternative(mint_boundary()),
                vec![Entity::Single(text), html],
            ),
            (Some(text), None) => Entity::Single(text),
            (None, Some(html)) => html,
            // Ruled out by MessageBuilder::finish
            (None, None) => unreachable!("message without a body"),
        };

        if self.attachments.is_empty() {
            body
        } else {
            let mut children = vec![body];
            children.extend(self.attachments.iter().map(Entity::Single));
            Entity::container(ContentType::multipart_mixed(mint_boundary()), children)
        }
    }
}

/// A node of the serialization tree.
enum Entity<'a> {
    Single(&'a Part),
    Multi {
        content_type: ContentType,
        children: Vec<Entity<'a>>,
    },
}

impl<'a> Entity<'a> {
    fn container(content_type: ContentType, children: Vec<Entity<'a>>) -> Self {
        Self::Multi {
            content_type,
            children,
        }
    }
}

/// Writes an entity's headers, a blank separator line, and its body.
fn write_entity(out: &mut Vec<u8>, entity: &Entity<'_>) {
    match entity {
        Entity::Single(part) => {
            part.headers.write_to(out);
            out.extend_from_slice(
                format!("Content-Transfer-Encoding: {}\r\n", part.encoding).as_bytes(),
            );
            out.extend_from_slice(b"\r\n");
            let encoded = match part.encoding {
                TransferEncoding::QuotedPrintable => {
                    encode_quoted_printable(&String::from_utf8_lossy(&part.body))
                }
                TransferEncoding::Base64 => encode_base64_wrapped(&part.body),
            };
            out.extend_from_slice(encoded.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        Entity::Multi {
            content_type,
            children,
        } => {
            // Boundary is always present on multipart content types
            let boundary = content_type.boundary().unwrap_or_default().to_string();
            out.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            out.extend_from_slice(b"\r\n");
            for child in children {
                out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
                write_entity(out, child);
            }
            out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn envelope() -> Envelope {
        Envelope::new("sender@example.com", "Test").to("recipient@example.com")
    }

    #[test]
    fn test_text_only_message_is_single_part() {
        let msg = ComposedMessage::build(envelope())
            .text("Hello, World!")
            .finish()
            .unwrap();

        let bytes = msg.to_bytes();
        let s = String::from_utf8(bytes).unwrap();
        assert!(s.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(!s.contains("multipart"));
        assert!(s.contains("Hello, World!"));
        assert!(msg.html_body().is_none());
    }

    #[test]
    fn test_text_and_html_produces_alternative() {
        let msg = ComposedMessage::build(envelope())
            .text("plain")
            .html(HtmlBody::new(Part::html("<p>rich</p>")))
            .finish()
            .unwrap();

        let s = String::from_utf8(msg.to_bytes()).unwrap();
        assert!(s.contains("multipart/alternative"));
        // Plaintext alternative precedes the HTML alternative
        let text_pos = s.find("text/plain").unwrap();
        let html_pos = s.find("text/html").unwrap();
        assert!(text_pos < html_pos);
    }

    #[test]
    fn test_inline_parts_nest_under_related() {
        let id = ContentId::mint();
        let html = format!("<img src=\"{}\" />", id.cid_url());
        let inline = InlinePart::new(
            &ContentType::new("image", "png"),
            "logo.png",
            vec![1, 2, 3],
            id.clone(),
        );

        let msg = ComposedMessage::build(envelope())
            .text("plain")
            .html(HtmlBody::new(Part::html(html)).with_inline(vec![inline]))
            .finish()
            .unwrap();

        let s = String::from_utf8(msg.to_bytes()).unwrap();
        assert!(s.contains("multipart/related"));
        assert!(s.contains(&format!("Content-ID: <{}>", id.as_str())));
        let related_pos = s.find("multipart/related").unwrap();
        let alternative_pos = s.find("multipart/alternative").unwrap();
        assert!(alternative_pos < related_pos);
    }

    #[test]
    fn test_attachments_wrap_in_mixed() {
        let attachment = Part::attachment(
            &ContentType::new("application", "pdf"),
            "report.pdf",
            vec![0x25, 0x50, 0x44, 0x46],
        );
        let msg = ComposedMessage::build(envelope())
            .text("see attached")
            .attach(attachment)
            .finish()
            .unwrap();

        let s = String::from_utf8(msg.to_bytes()).unwrap();
        assert!(s.contains("multipart/mixed"));
        assert!(s.contains("Content-Disposition: attachment; filename=\"report.pdf\""));
    }

    #[test]
    fn test_every_boundary_is_terminated() {
        let msg = ComposedMessage::build(envelope())
            .text("plain")
            .html(HtmlBody::new(Part::html("<p>rich</p>")))
            .attach(Part::attachment(
                &ContentType::octet_stream(),
                "data.bin",
                vec![0u8; 16],
            ))
            .finish()
            .unwrap();

        let s = String::from_utf8(msg.to_bytes()).unwrap();
        for line in s.lines() {
            if let Some(boundary) = line.strip_prefix("Content-Type: multipart/") {
                let boundary = boundary
                    .split("boundary=")
                    .nth(1)
                    .unwrap()
                    .trim_matches('"');
                assert!(s.contains(&format!("--{boundary}--")));
            }
        }
    }

    #[test]
    fn test_bcc_never_serialized() {
        let msg = ComposedMessage::build(
            Envelope::new("sender@example.com", "Test")
                .to("a@example.com")
                .bcc("hidden@example.com"),
        )
        .text("hi")
        .finish()
        .unwrap();

        let s = String::from_utf8(msg.to_bytes()).unwrap();
        assert!(!s.contains("hidden@example.com"));
        assert!(
            msg.envelope()
                .recipients()
                .any(|r| r == "hidden@example.com")
        );
    }

    #[test]
    fn test_empty_body_rejected() {
        let err = ComposedMessage::build(envelope()).finish().unwrap_err();
        assert!(matches!(err, Error::EmptyBody));
    }

    #[test]
    fn test_no_recipients_rejected() {
        let err = ComposedMessage::build(Envelope::new("sender@example.com", "Test"))
            .text("hi")
            .finish()
            .unwrap_err();
        assert!(matches!(err, Error::NoRecipients));
    }

    #[test]
    fn test_bad_address_rejected() {
        let err = ComposedMessage::build(
            Envelope::new("sender@example.com", "Test").to("not-an-address"),
        )
        .text("hi")
        .finish()
        .unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));
    }

    #[test]
    fn test_empty_subject_allowed() {
        let msg = ComposedMessage::build(
            Envelope::new("sender@example.com", "").to("a@example.com"),
        )
        .text("hi")
        .finish()
        .unwrap();
        assert_eq!(msg.envelope().subject, "");
    }

    #[test]
    fn test_headers_include_date_and_message_id() {
        let msg = ComposedMessage::build(envelope())
            .text("hi")
            .finish()
            .unwrap();
        assert!(msg.headers().get("Date").is_some());
        assert!(msg.headers().get("Message-ID").is_some());
        assert_eq!(msg.headers().get("MIME-Version"), Some("1.0"));
    }
}
