//! Error types for the ats-resume-expert library.
//!
//! Every failure of an interaction is an [`AtsError`]. The variants split
//! into two groups the CLI treats differently:
//!
//! * **User-correctable**: no resume supplied, a file that is not a PDF, a
//!   missing API key. The user can fix these and run again; the binary
//!   reports them as warnings with exit code 2.
//! * **Everything else**: the model API failed, pdfium could not be loaded,
//!   an internal task panicked. Reported as-is with exit code 1.
//!
//! A reply without a parsable match percentage is *not* an error; it is
//! [`crate::output::MatchVerdict::Indeterminate`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the ats-resume-expert library.
#[derive(Debug, Error)]
pub enum AtsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No resume was supplied for an action that needs one.
    #[error("Please upload your resume.\nPass a PDF with --resume <PATH|URL>.")]
    MissingInput,

    /// Resume file was not found at the given path.
    #[error("Resume file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The upload does not carry the one accepted extension.
    #[error("Unsupported resume '{name}': only .pdf uploads are accepted")]
    UnsupportedUpload { name: String },

    /// Downloading a resume from a URL failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// The document could not be read or rasterised.
    #[error("Could not render resume '{name}': {detail}")]
    DocumentRender { name: String, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium for your platform, then either:\n\
  • place the shared library next to the binary, or\n\
  • set PDFIUM_LIB_PATH=/dir/containing/libpdfium.\n"
    )]
    PdfiumBinding(String),

    // ── Model errors ──────────────────────────────────────────────────────
    /// The credential for the default model backend is missing.
    #[error("{var} is not set.\nExport it or add it to a .env file before running.")]
    MissingCredential { var: String },

    /// A named provider could not be created (unknown name, missing key, …).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The model call failed (network, auth, quota, blocked reply). Not retried.
    #[error("Model call failed: {message}")]
    ModelInvocation { message: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AtsError {
    /// Whether the user can fix this by changing their input or environment.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            AtsError::MissingInput
                | AtsError::FileNotFound { .. }
                | AtsError::UnsupportedUpload { .. }
                | AtsError::DownloadFailed { .. }
                | AtsError::DocumentRender { .. }
                | AtsError::MissingCredential { .. }
                | AtsError::ProviderNotConfigured { .. }
                | AtsError::InvalidConfig(_)
        )
    }
}
