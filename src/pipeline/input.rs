//! Input resolution: turn a user-supplied path or URL into an in-memory
//! [`UploadedDocument`].
//!
//! pdfium can load straight from a byte slice, so nothing is written to disk;
//! the bytes live only as long as the interaction that owns them.

use crate::error::AtsError;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// The one upload extension accepted.
pub const ACCEPTED_EXTENSION: &str = "pdf";

/// Resume bytes supplied for one interaction.
#[derive(Clone)]
pub struct UploadedDocument {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Display name (file name or URL segment).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A zero-byte upload counts as no upload.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the content starts with the `%PDF` signature.
    pub fn has_pdf_magic(&self) -> bool {
        self.bytes.starts_with(b"%PDF")
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load a resume from a local path or an HTTP(S) URL.
pub async fn load_document(
    input: &str,
    download_timeout_secs: u64,
) -> Result<UploadedDocument, AtsError> {
    if is_url(input) {
        download_url(input, download_timeout_secs).await
    } else {
        read_local(input).await
    }
}

/// Reject uploads that do not carry the `.pdf` extension.
pub fn check_extension(name: &str) -> Result<(), AtsError> {
    let ok = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ACCEPTED_EXTENSION));
    if ok {
        Ok(())
    } else {
        Err(AtsError::UnsupportedUpload {
            name: name.to_string(),
        })
    }
}

async fn read_local(path_str: &str) -> Result<UploadedDocument, AtsError> {
    check_extension(path_str)?;
    let path = PathBuf::from(path_str);

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AtsError::FileNotFound { path: path.clone() },
        _ => AtsError::DocumentRender {
            name: path.display().to_string(),
            detail: e.to_string(),
        },
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.to_string());
    debug!("Read local resume {} ({} bytes)", path.display(), bytes.len());
    Ok(UploadedDocument::new(name, bytes))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<UploadedDocument, AtsError> {
    // Same single-extension rule as local files, checked before any request.
    let name = filename_from_url(url);
    check_extension(&name)?;
    info!("Downloading resume from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AtsError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| AtsError::DownloadFailed {
        url: url.to_string(),
        reason: if e.is_timeout() {
            format!("timed out after {timeout_secs}s")
        } else {
            e.to_string()
        },
    })?;

    if !response.status().is_success() {
        return Err(AtsError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AtsError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(UploadedDocument::new(name, bytes.to_vec()))
}

/// Last path segment of the URL, or `resume.pdf` when the path is empty.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }
    "resume.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/cv.pdf"));
        assert!(is_url("http://example.com/cv.pdf"));
        assert!(!is_url("/tmp/cv.pdf"));
        assert!(!is_url("cv.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(check_extension("resume.pdf").is_ok());
        assert!(check_extension("RESUME.PDF").is_ok());
        assert!(matches!(
            check_extension("resume.docx"),
            Err(AtsError::UnsupportedUpload { .. })
        ));
        assert!(check_extension("resume").is_err());
    }

    #[test]
    fn filename_from_url_falls_back() {
        assert_eq!(filename_from_url("https://x.io/files/cv.pdf"), "cv.pdf");
        assert_eq!(filename_from_url("https://x.io/"), "resume.pdf");
    }

    #[test]
    fn url_filename_ignores_query() {
        assert_eq!(filename_from_url("https://x.io/cv.PDF?dl=1"), "cv.PDF");
        assert!(check_extension(&filename_from_url("https://x.io/cv.PDF?dl=1")).is_ok());
    }

    #[tokio::test]
    async fn url_without_pdf_extension_is_rejected_before_download() {
        // .invalid never resolves, so reaching the network would be DownloadFailed.
        for url in ["https://example.invalid/files/cv", "https://example.invalid/cv.docx"] {
            let err = load_document(url, 1).await.unwrap_err();
            assert!(
                matches!(err, AtsError::UnsupportedUpload { .. }),
                "{url}: {err:?}"
            );
        }
    }

    #[test]
    fn magic_and_emptiness() {
        assert!(UploadedDocument::new("a.pdf", b"%PDF-1.7\n".to_vec()).has_pdf_magic());
        assert!(!UploadedDocument::new("a.pdf", b"PK\x03\x04".to_vec()).has_pdf_magic());
        assert!(UploadedDocument::new("a.pdf", Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn missing_local_file() {
        let err = load_document("/definitely/not/here/cv.pdf", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AtsError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.pdf");
        std::fs::write(&path, b"%PDF-1.4 fake").unwrap();
        let doc = load_document(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(doc.name(), "cv.pdf");
        assert!(doc.has_pdf_magic());
    }
}
