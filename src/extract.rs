//! PDF text extraction.
//!
//! Uploaded bytes are written to a scoped temporary file, read back page by
//! page with `pdf-extract`, and the file is removed before returning. Only
//! PDF input is accepted; the type is inferred from the `%PDF-` header.

use std::io::Write;
use std::path::Path;

use thiserror::Error;

/// How far into the buffer the `%PDF-` marker may appear.
const HEADER_SEARCH_BYTES: usize = 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a PDF document (no %PDF- header found)")]
    NotPdf,
    #[error("temporary file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("PDF contains no extractable text")]
    NoText,
}

/// Infer whether `bytes` hold a PDF document.
pub fn is_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SEARCH_BYTES)];
    head.windows(5).any(|w| w == b"%PDF-")
}

/// Extract the text of every page, in page order.
///
/// Fails with [`ExtractError::NoText`] when no page carries any
/// non-whitespace text (e.g. scanned documents without a text layer).
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    extract_pdf_pages_in(bytes, &std::env::temp_dir())
}

/// Like [`extract_pdf_pages`], with the temporary file created in `dir`.
pub fn extract_pdf_pages_in(bytes: &[u8], dir: &Path) -> Result<Vec<String>, ExtractError> {
    if !is_pdf(bytes) {
        return Err(ExtractError::NotPdf);
    }

    let mut tmp = tempfile::Builder::new()
        .prefix("pdfqa-upload-")
        .suffix(".pdf")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tracing::debug!(path = %tmp.path().display(), bytes = bytes.len(), "wrote upload to temp file");

    let pages = pdf_extract::extract_text_by_pages(tmp.path())
        .map_err(|e| ExtractError::Pdf(e.to_string()));

    // Remove the temp file now; an Err here surfaces a failed unlink.
    tmp.close()?;

    let pages = pages?;
    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(ExtractError::NoText);
    }

    tracing::debug!(pages = pages.len(), "extracted pdf text");
    Ok(pages)
}
