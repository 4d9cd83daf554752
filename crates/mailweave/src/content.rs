//! Message content model.

/// The textual content of a message: any combination of plain text,
/// markdown and ready-made HTML.
///
/// At least one variant must be non-empty by composition time. When
/// both markdown and HTML are present, rendered markdown wins; the
/// plaintext variant is always carried alongside when present.
#[derive(Debug, Clone, Default)]
pub struct ContentSet {
    /// Plaintext body.
    pub text: Option<String>,
    /// Markdown source, rendered to HTML at composition time.
    pub markdown: Option<String>,
    /// Ready-made HTML body.
    pub html: Option<String>,
}

impl ContentSet {
    /// Creates an empty content set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the plaintext body.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the markdown source.
    #[must_use]
    pub fn markdown(mut self, markdown: impl Into<String>) -> Self {
        self.markdown = Some(markdown.into());
        self
    }

    /// Sets the ready-made HTML body.
    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Returns true if no variant carries any content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.text) && blank(&self.markdown) && blank(&self.html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_detection() {
        assert!(ContentSet::new().is_empty());
        assert!(ContentSet::new().text("   ").is_empty());
        assert!(!ContentSet::new().text("hello").is_empty());
        assert!(!ContentSet::new().markdown("# hi").is_empty());
        assert!(!ContentSet::new().html("<p>hi</p>").is_empty());
    }
}
