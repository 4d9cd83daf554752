//! Markdown rendering behind a trait seam.

use pulldown_cmark::{Options, Parser, html};

/// Renders markdown to an HTML fragment.
///
/// Pure function of its input; implementations do no I/O.
pub trait MarkdownRenderer {
    /// Renders the markdown source to HTML.
    fn render(&self, markdown: &str) -> String;
}

/// Default renderer: CommonMark with tables, strikethrough and
/// footnotes enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkRenderer;

impl CommonMarkRenderer {
    /// Creates the default renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);

        let parser = Parser::new_ext(markdown, options);
        let mut output = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut output, parser);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_heading_and_emphasis() {
        let html = CommonMarkRenderer::new().render("# Title\n\nSome *emphasis*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_renders_image_reference() {
        let html = CommonMarkRenderer::new().render("![logo](logo.png)");
        assert!(html.contains("<img src=\"logo.png\""));
    }

    #[test]
    fn test_renders_table() {
        let html = CommonMarkRenderer::new().render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_renders_strikethrough() {
        let html = CommonMarkRenderer::new().render("~~gone~~");
        assert!(html.contains("<del>gone</del>"));
    }
}
