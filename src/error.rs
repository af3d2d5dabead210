//! Error types for the resume-ats library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AtsError`] is **fatal**: the pipeline cannot produce a result at all
//!   (empty input, malformed keyword JSON, an archive field overflow, a bad
//!   configuration). Returned as `Err(AtsError)` from the top-level
//!   `run_pipeline` / `optimize*` functions.
//!
//! * [`ExportError`] is **non-fatal**: one output format failed while others
//!   may already have been produced. Stored inside
//!   [`crate::output::ExportReport`] so callers can keep the artifacts that
//!   did succeed.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the resume-ats library.
#[derive(Debug, Error)]
pub enum AtsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The résumé text was empty or whitespace only; nothing to parse.
    #[error("Résumé text is empty; nothing to parse")]
    EmptyInput,

    /// The keyword-groups document could not be decoded.
    #[error("Invalid keyword groups: {detail}\nExpected an object like {{\"highROI\": [\"Rust\"], \"medium\": [...]}}")]
    InvalidKeywords { detail: String },

    // ── Encoding errors ───────────────────────────────────────────────────
    /// A count, size or offset does not fit the fixed-width ZIP field.
    #[error("Archive field '{field}' overflowed: {value} does not fit (ZIP64 is not supported)")]
    ArchiveOverflow { field: &'static str, value: u64 },

    /// Writing the PDF byte stream failed.
    #[error("Failed to assemble PDF: {0}")]
    PdfWrite(#[from] std::io::Error),

    /// A single export format failed inside the pipeline.
    #[error("Export to {format} failed: {detail}")]
    ExportFailed { format: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single export format.
///
/// Recorded by [`crate::optimize::export_formats`] together with the formats
/// that were produced before the failure.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("{format}: {detail}")]
pub struct ExportError {
    /// File extension of the format that failed (`txt`, `docx`, `pdf`).
    pub format: String,
    /// Human-readable failure description.
    pub detail: String,
}

impl From<ExportError> for AtsError {
    fn from(e: ExportError) -> Self {
        AtsError::ExportFailed {
            format: e.format,
            detail: e.detail,
        }
    }
}
