//! Append-only sent-message log.

use crate::error::Result;
use chrono::Local;
use mailweave_mime::Envelope;
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Human-readable log of sent messages.
///
/// Appends one record per send: a timestamped subject line followed by
/// indented recipient lines. Never rewrites existing content.
#[derive(Debug, Clone)]
pub struct SentLog {
    path: PathBuf,
}

impl SentLog {
    /// Creates a log handle for the given path. The file is created on
    /// first record.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends one record for the message envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written.
    pub async fn record(&self, envelope: &Envelope) -> Result<()> {
        let mut entry = format!(
            "{} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            envelope.subject
        );
        if !envelope.to.is_empty() {
            let _ = writeln!(entry, "\tTo: {}", envelope.to.join(", "));
        }
        if !envelope.cc.is_empty() {
            let _ = writeln!(entry, "\tCc: {}", envelope.cc.join(", "));
        }
        if !envelope.bcc.is_empty() {
            let _ = writeln!(entry, "\tBcc: {}", envelope.bcc.join(", "));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn envelope() -> Envelope {
        Envelope::new("sender@example.com", "Weekly update")
            .to("a@example.com")
            .cc("b@example.com")
    }

    #[tokio::test]
    async fn test_record_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = SentLog::new(dir.path().join("sent.log"));

        log.record(&envelope()).await.unwrap();
        log.record(&envelope()).await.unwrap();

        let contents = tokio::fs::read_to_string(dir.path().join("sent.log"))
            .await
            .unwrap();
        assert_eq!(contents.matches("Weekly update").count(), 2);
        assert!(contents.contains("\tTo: a@example.com"));
        assert!(contents.contains("\tCc: b@example.com"));
        assert!(!contents.contains("\tBcc:"));
    }
}
