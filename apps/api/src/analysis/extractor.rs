//! PDF text extraction.
//!
//! `pdf-extract` can panic on malformed input instead of returning an error,
//! so every call goes through `catch_unwind` and comes back as an
//! [`ExtractionError`]. Extraction is CPU-bound and runs on the blocking pool.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("not a readable PDF: {0}")]
    InvalidPdf(String),

    #[error("PDF extraction panicked (malformed document)")]
    Panicked,

    #[error("extraction task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Text of every page, in page order, trimmed.
    async fn extract(&self, pdf: Bytes) -> Result<String, ExtractionError>;

    /// Path form of [`TextExtractor::extract`], for résumés already on disk.
    /// Uploads go through `extract` directly and never touch the filesystem.
    async fn extract_path(&self, path: &Path) -> Result<String, ExtractionError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| ExtractionError::Io {
                path: path.display().to_string(),
                source,
            })?;
        self.extract(Bytes::from(data)).await
    }
}

/// [`TextExtractor`] backed by `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, pdf: Bytes) -> Result<String, ExtractionError> {
        let pages = tokio::task::spawn_blocking(move || extract_pages(&pdf))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))??;
        debug!("Extracted {} page(s) from PDF", pages.len());
        Ok(join_pages(&pages))
    }
}

fn extract_pages(data: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::InvalidPdf(e.to_string())),
        Err(_) => Err(ExtractionError::Panicked),
    }
}

/// Concatenates pages in order with no separator and trims the result.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let joined: String = pages.iter().map(AsRef::as_ref).collect();
    joined.trim().to_string()
}
