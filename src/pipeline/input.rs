//! Input resolution: turn a user-supplied path or URL into a document buffer.
//!
//! Resolution happens inside each document's own task, so an unreadable
//! file or a failed download becomes that document's
//! [`DocumentError::InvalidInput`] instead of aborting the batch.

use crate::error::DocumentError;
use std::path::Path;
use tracing::{debug, info};

/// One uploaded document: a display name and its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl DocumentInput {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reject a missing or empty buffer.
    pub fn validate(&self, index: usize) -> Result<(), DocumentError> {
        if self.bytes.is_empty() {
            return Err(DocumentError::InvalidInput {
                index,
                detail: format!("'{}' is empty", self.name),
            });
        }
        Ok(())
    }
}

/// Where a document comes from: an in-memory upload or a path/URL still to be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Buffer(DocumentInput),
    Location(String),
}

impl DocumentSource {
    /// Produce the document's bytes, reading or downloading when needed.
    pub async fn load(self, index: usize, timeout_secs: u64) -> Result<DocumentInput, DocumentError> {
        match self {
            DocumentSource::Buffer(input) => Ok(input),
            DocumentSource::Location(source) => resolve_input(&source, index, timeout_secs).await,
        }
    }
}

impl From<DocumentInput> for DocumentSource {
    fn from(input: DocumentInput) -> Self {
        DocumentSource::Buffer(input)
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a path or URL to a [`DocumentInput`].
pub async fn resolve_input(
    source: &str,
    index: usize,
    timeout_secs: u64,
) -> Result<DocumentInput, DocumentError> {
    if is_url(source) {
        download_url(source, index, timeout_secs).await
    } else {
        read_local(source, index).await
    }
}

async fn read_local(path_str: &str, index: usize) -> Result<DocumentInput, DocumentError> {
    let path = Path::new(path_str);
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DocumentError::InvalidInput {
            index,
            detail: format!("cannot read '{}': {}", path.display(), e),
        })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(DocumentInput::new(file_name(path_str), bytes))
}

async fn download_url(
    url: &str,
    index: usize,
    timeout_secs: u64,
) -> Result<DocumentInput, DocumentError> {
    info!("Downloading document {} from: {}", index, url);
    let invalid = |detail: String| DocumentError::InvalidInput { index, detail };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| invalid(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            invalid(format!("download of '{url}' timed out after {timeout_secs}s"))
        } else {
            invalid(format!("download of '{url}' failed: {e}"))
        }
    })?;

    if !response.status().is_success() {
        return Err(invalid(format!(
            "download of '{}' failed: HTTP {}",
            url,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| invalid(format!("download of '{url}' failed: {e}")))?;

    Ok(DocumentInput::new(file_name(url), bytes.to_vec()))
}

/// Last path segment of a path or URL, for display.
pub fn file_name(source: &str) -> String {
    let trimmed = source.split(['?', '#']).next().unwrap_or(source);
    trimmed
        .rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or(source)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/scan.png"));
        assert!(is_url("http://example.com/scan.png"));
        assert!(!is_url("/tmp/scan.png"));
        assert!(!is_url("scan.png"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/tmp/a/receipt.jpg"), "receipt.jpg");
        assert_eq!(file_name("https://host/x/form.png?sig=1"), "form.png");
        assert_eq!(file_name("plain.png"), "plain.png");
    }

    #[test]
    fn empty_buffer_is_invalid() {
        let err = DocumentInput::new("blank.png", Vec::new())
            .validate(3)
            .unwrap_err();
        assert_eq!(err.index(), 3);
        assert!(err.to_string().contains("blank.png"));
        assert!(DocumentInput::new("a", vec![1u8]).validate(1).is_ok());
    }

    #[tokio::test]
    async fn reads_local_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"bytes").unwrap();
        let path = tmp.path().to_string_lossy().to_string();
        let input = resolve_input(&path, 1, 5).await.unwrap();
        assert_eq!(input.bytes, b"bytes");
    }

    #[tokio::test]
    async fn missing_file_is_document_error() {
        let err = resolve_input("/definitely/not/here.png", 2, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidInput { index: 2, .. }));
    }
}
