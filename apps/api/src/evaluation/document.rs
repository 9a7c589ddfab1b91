//! Converts an uploaded résumé into page-ordered text.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{error, info};

/// How far into the file the `%PDF-` header may appear. Readers tolerate a
/// short preamble before it.
const PDF_HEADER_WINDOW: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
}

impl DocumentFormat {
    /// Infers the declared format from an upload's file name.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        file_name
            .to_ascii_lowercase()
            .ends_with(".pdf")
            .then_some(DocumentFormat::Pdf)
    }
}

/// Raw bytes of an uploaded document. Lives for one evaluation request.
#[derive(Debug, Clone)]
pub struct CandidateDocument {
    pub bytes: Bytes,
    pub format: DocumentFormat,
}

impl CandidateDocument {
    #[cfg(test)]
    pub fn pdf(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            format: DocumentFormat::Pdf,
        }
    }
}

/// Text recovered from a document, one block per page, each followed by a
/// newline page break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for page in pages {
            text.push_str(page.as_ref());
            text.push('\n');
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

#[derive(Debug, Error)]
pub enum DocumentReadError {
    #[error("document is empty")]
    Empty,

    #[error("document is not a PDF")]
    UnsupportedFormat,

    #[error("could not read PDF: {0}")]
    Parse(String),

    #[error("PDF extraction aborted unexpectedly")]
    Aborted,
}

/// Turns document bytes into text. Implementations are synchronous and may be
/// CPU-heavy; the pipeline runs them on the blocking pool.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, document: &CandidateDocument) -> Result<ExtractedText, DocumentReadError>;
}

/// `pdf-extract` backed extractor.
pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, document: &CandidateDocument) -> Result<ExtractedText, DocumentReadError> {
        if document.bytes.is_empty() {
            return Err(DocumentReadError::Empty);
        }
        match document.format {
            DocumentFormat::Pdf if has_pdf_header(&document.bytes) => {}
            DocumentFormat::Pdf => return Err(DocumentReadError::UnsupportedFormat),
        }

        let pages = pdf_extract::extract_text_from_mem_by_pages(&document.bytes)
            .map_err(|e| DocumentReadError::Parse(e.to_string()))?;
        if pages.is_empty() {
            return Err(DocumentReadError::Parse("document has no pages".to_string()));
        }

        Ok(ExtractedText::from_pages(pages))
    }
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Runs `extractor` on the blocking pool. A panicking parser surfaces as
/// [`DocumentReadError::Aborted`].
pub async fn extract_document(
    extractor: Arc<dyn DocumentExtractor>,
    document: CandidateDocument,
) -> Result<ExtractedText, DocumentReadError> {
    info!("Extracting text from document");
    let text = tokio::task::spawn_blocking(move || extractor.extract(&document))
        .await
        .map_err(|e| {
            error!("Document extraction task failed: {e}");
            DocumentReadError::Aborted
        })??;
    info!("Extracted {} characters", text.char_count());
    Ok(text)
}
