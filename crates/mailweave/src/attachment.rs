//! File references for attachments and inline images.

use crate::error::{Error, Result};
use mailweave_mime::ContentType;
use std::path::{Path, PathBuf};

/// How a referenced file travels in the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// Downloadable attachment under the top-level multipart/mixed.
    Attachment,
    /// Image embedded in the HTML body via a `cid:` reference.
    Inline,
}

/// A file to include in a message: path, display name and role.
#[derive(Debug, Clone)]
pub struct FileReference {
    path: PathBuf,
    display_name: String,
    role: FileRole,
}

impl FileReference {
    /// Creates a reference with the display name defaulting to the
    /// file's base name.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, role: FileRole) -> Self {
        let path = path.into();
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            display_name,
            role,
        }
    }

    /// Overrides the display name used in headers and HTML matching.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> FileRole {
        self.role
    }

    /// Returns true if the referenced path exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the file fully into memory and infers its media type from
    /// the extension, falling back to image sniffing and then
    /// application/octet-stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the path does not exist, or an I/O
    /// error if the read fails.
    pub async fn load(&self) -> Result<LoadedFile> {
        if !self.exists() {
            return Err(Error::Config(format!(
                "file not found: {}",
                self.path.display()
            )));
        }

        let bytes = tokio::fs::read(&self.path).await?;
        let content_type = self
            .path
            .extension()
            .and_then(|ext| ContentType::from_extension(&ext.to_string_lossy()))
            .or_else(|| ContentType::sniff_image(&bytes))
            .unwrap_or_else(ContentType::octet_stream);

        Ok(LoadedFile {
            content_type,
            bytes,
        })
    }
}

/// File contents read into memory with the inferred media type.
#[derive(Debug)]
pub struct LoadedFile {
    /// Inferred media type.
    pub content_type: ContentType,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}
