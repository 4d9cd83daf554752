//! Message composition.
//!
//! Validates a compose request fail-fast, renders and resolves the
//! body, and assembles the immutable [`ComposedMessage`].

use crate::attachment::FileReference;
use crate::content::ContentSet;
use crate::error::{Error, Result};
use crate::render::MarkdownRenderer;
use crate::resolver::resolve_images;
use mailweave_mime::{ComposedMessage, Envelope, HtmlBody, Part};

/// Everything needed to compose one message.
#[derive(Debug, Default)]
pub struct ComposeRequest {
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
    /// Body content.
    pub content: ContentSet,
    /// Downloadable attachments.
    pub attachments: Vec<FileReference>,
    /// Inline image candidates for embedded references.
    pub inline_images: Vec<FileReference>,
}

impl ComposeRequest {
    /// Creates a request with a sender and subject.
    #[must_use]
    pub fn new(from: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            subject: subject.into(),
            ..Default::default()
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

    /// Sets the body content.
    #[must_use]
    pub fn content(mut self, content: ContentSet) -> Self {
        self.content = content;
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, file: FileReference) -> Self {
        self.attachments.push(file);
        self
    }

    /// Adds an inline image candidate.
    #[must_use]
    pub fn inline_image(mut self, file: FileReference) -> Self {
        self.inline_images.push(file);
        self
    }
}

/// Substrings in a plaintext body that suggest a file was meant to be
/// attached. All lowercase; matched case-insensitively.
const ATTACHMENT_HINTS: &[&str] = &[
    "attach",
    "enclosed",
    " cv ",
    "resume",
    "cover letter",
    ".doc",
    ".pdf",
    ".xls",
    ".ppt",
];

/// Fails composition when the body mentions an attachment but none was
/// supplied, so the mail is not sent without its file.
fn check_attachment_hints(text: &str) -> Result<()> {
    let lower = text.to_lowercase();
    for hint in ATTACHMENT_HINTS {
        if lower.contains(hint) {
            return Err(Error::Config(format!(
                "attachment required because \"{hint}\" is in the email"
            )));
        }
    }
    Ok(())
}

/// Composes a message from the request.
///
/// Validation happens before any part is built: at least one recipient,
/// non-empty content, every referenced path present. The produced
/// message carries no connection state.
///
/// # Errors
///
/// Returns [`Error::Config`] for validation failures and
/// [`Error::Mime`] if the envelope is malformed.
pub async fn compose(
    request: &ComposeRequest,
    renderer: &dyn MarkdownRenderer,
) -> Result<ComposedMessage> {
    if request.to.is_empty() && request.cc.is_empty() && request.bcc.is_empty() {
        return Err(Error::Config("no recipients given".into()));
    }
    if request.content.is_empty() {
        return Err(Error::Config("no content given".into()));
    }
    for file in request.attachments.iter().chain(&request.inline_images) {
        if !file.exists() {
            return Err(Error::Config(format!(
                "file not found: {}",
                file.path().display()
            )));
        }
    }
    if request.attachments.is_empty() {
        if let Some(text) = &request.content.text {
            check_attachment_hints(text)?;
        }
    }

    // Rendered markdown wins over ready-made HTML
    let html_source = request
        .content
        .markdown
        .as_deref()
        .map(|markdown| renderer.render(markdown))
        .or_else(|| request.content.html.clone());

    let html_body = match html_source {
        Some(html) => {
            let resolved = resolve_images(&html, &request.inline_images).await?;
            Some(HtmlBody::new(Part::html(resolved.html)).with_inline(resolved.inline))
        }
        None => None,
    };

    let mut envelope = Envelope::new(request.from.clone(), request.subject.clone());
    envelope.to.clone_from(&request.to);
    envelope.cc.clone_from(&request.cc);
    envelope.bcc.clone_from(&request.bcc);

    let mut builder = ComposedMessage::build(envelope);
    if let Some(text) = &request.content.text {
        builder = builder.text(text.clone());
    }
    if let Some(html) = html_body {
        builder = builder.html(html);
    }
    for file in &request.attachments {
        let loaded = file.load().await?;
        builder = builder.attach(Part::attachment(
            &loaded.content_type,
            file.display_name(),
            loaded.bytes,
        ));
    }

    let message = builder.finish()?;
    tracing::debug!(
        subject = %message.envelope().subject,
        recipients = message.envelope().recipients().count(),
        attachments = message.attachments().len(),
        "message composed"
    );
    Ok(message)
}
