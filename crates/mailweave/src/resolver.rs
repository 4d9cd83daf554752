//! Embedded-image resolution.
//!
//! Scans rendered HTML for `<img>` elements whose `src` points at a
//! local file, rewrites each to a `cid:` reference, and produces the
//! matching inline parts.

use crate::attachment::{FileReference, FileRole};
use crate::error::{Error, Result};
use mailweave_mime::{ContentId, InlinePart};
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// HTML with all local image references rewritten, plus the inline
/// parts they resolved to.
#[derive(Debug)]
pub struct ResolvedHtml {
    /// The rewritten HTML.
    pub html: String,
    /// Inline parts in first-reference order, one per distinct path.
    pub inline: Vec<InlinePart>,
}

// Fixed pattern known to compile
#[allow(clippy::unwrap_used)]
fn img_src_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap())
}

/// Returns true for references the resolver must leave alone.
fn is_external(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    ["http://", "https://", "cid:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Maps an HTML `src` value to a file reference, preferring the
/// supplied candidates (by display name, full path, or base name)
/// before treating the value as a path itself. A matched candidate is
/// returned as-is so its display name reaches the part headers.
fn resolve_reference(src: &str, candidates: &[FileReference]) -> FileReference {
    for candidate in candidates {
        let matches_name = candidate.display_name() == src
            || candidate.path() == Path::new(src)
            || candidate
                .path()
                .file_name()
                .is_some_and(|name| name.to_string_lossy() == src);
        if matches_name {
            return candidate.clone();
        }
    }
    FileReference::new(src, FileRole::Inline)
}

/// Rewrites local image references in the HTML to `cid:` URLs and
/// loads the referenced images as inline parts.
///
/// Repeated references to one path share a single [`ContentId`].
/// Candidates never referenced from the HTML produce no inline part.
///
/// # Errors
///
/// Returns [`Error::Config`] if a referenced path does not exist or is
/// not an image.
pub async fn resolve_images(
    html: &str,
    candidates: &[FileReference],
) -> Result<ResolvedHtml> {
    // First pass: find the src ranges of local references
    let mut references: Vec<(Range<usize>, String)> = Vec::new();
    for captures in img_src_regex().captures_iter(html) {
        let Some(src) = captures.get(1).or_else(|| captures.get(2)) else {
            continue;
        };
        if !is_external(src.as_str()) {
            references.push((src.range(), src.as_str().to_string()));
        }
    }

    // Second pass: load each distinct path once
    let mut ids: HashMap<PathBuf, ContentId> = HashMap::new();
    let mut inline = Vec::new();
    for (_, src) in &references {
        let reference = resolve_reference(src, candidates);
        let path = reference.path().to_path_buf();
        if ids.contains_key(&path) {
            continue;
        }

        let loaded = reference.load().await?;
        if !loaded.content_type.is_image() {
            return Err(Error::Config(format!(
                "embedded reference is not an image: {}",
                path.display()
            )));
        }

        let id = ContentId::mint();
        inline.push(InlinePart::new(
            &loaded.content_type,
            reference.display_name(),
            loaded.bytes,
            id.clone(),
        ));
        ids.insert(path, id);
    }

    for candidate in candidates {
        if !ids.contains_key(candidate.path()) {
            tracing::warn!(
                path = %candidate.path().display(),
                "inline candidate never referenced from the HTML"
            );
        }
    }

    // Third pass: splice the cid URLs over the original src values
    let mut rewritten = String::with_capacity(html.len());
    let mut last = 0;
    for (range, src) in &references {
        let path = resolve_reference(src, candidates).path().to_path_buf();
        // Every referenced path was inserted in the second pass
        if let Some(id) = ids.get(&path) {
            rewritten.push_str(&html[last..range.start]);
            rewritten.push_str(&id.cid_url());
            last = range.end;
        }
    }
    rewritten.push_str(&html[last..]);

    Ok(ResolvedHtml {
        html: rewritten,
        inline,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn png_file() -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00])
            .unwrap();
        tmp
    }

    #[tokio::test]
    async fn test_local_reference_becomes_cid() {
        let tmp = png_file();
        let html = format!("<p><img src=\"{}\" /></p>", tmp.path().display());

        let resolved = resolve_images(&html, &[]).await.unwrap();
        assert_eq!(resolved.inline.len(), 1);
        let cid = resolved.inline[0].content_id.cid_url();
        assert!(resolved.html.contains(&format!("src=\"{cid}\"")));
        assert!(!resolved.html.contains(&tmp.path().display().to_string()));
    }

    #[tokio::test]
    async fn test_external_references_untouched() {
        let html = "<img src=\"https://example.com/a.png\"> <img src='cid:x@y'> \
                    <img src=\"data:image/png;base64,AAAA\">";
        let resolved = resolve_images(html, &[]).await.unwrap();
        assert_eq!(resolved.html, html);
        assert!(resolved.inline.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_reference_shares_one_id() {
        let tmp = png_file();
        let path = tmp.path().display().to_string();
        let html = format!("<img src=\"{path}\"><img src=\"{path}\">");

        let resolved = resolve_images(&html, &[]).await.unwrap();
        assert_eq!(resolved.inline.len(), 1);
        let cid = resolved.inline[0].content_id.cid_url();
        assert_eq!(resolved.html.matches(&cid).count(), 2);
    }

    #[tokio::test]
    async fn test_candidate_matched_by_display_name() {
        let tmp = png_file();
        let candidate = FileReference::new(tmp.path(), FileRole::Inline)
            .with_display_name("logo.png");
        let html = "<img src=\"logo.png\">";

        let resolved = resolve_images(html, &[candidate]).await.unwrap();
        assert_eq!(resolved.inline.len(), 1);
        assert!(resolved.html.starts_with("<img src=\"cid:"));
    }

    #[tokio::test]
    async fn test_candidate_display_name_reaches_part_headers() {
        let tmp = png_file();
        let candidate = FileReference::new(tmp.path(), FileRole::Inline)
            .with_display_name("logo.png");
        let html = "<img src=\"logo.png\">";

        let resolved = resolve_images(html, &[candidate]).await.unwrap();
        let headers = &resolved.inline[0].part.headers;
        assert_eq!(
            headers.get("Content-Disposition"),
            Some("inline; filename=\"logo.png\"")
        );
        assert!(
            headers
                .get("Content-Type")
                .unwrap()
                .contains("name=logo.png")
        );
    }

    #[tokio::test]
    async fn test_missing_file_fails_fast() {
        let html = "<img src=\"/no/such/image.png\">";
        let err = resolve_images(html, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_non_image_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"just text").unwrap();
        let html = format!("<img src=\"{}\">", tmp.path().display());

        let err = resolve_images(&html, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
