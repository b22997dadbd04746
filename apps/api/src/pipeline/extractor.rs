//! Text Extractor: PDF bytes → plain text, pages concatenated in order.

use lopdf::Document as PdfDocument;
use tracing::{debug, warn};

use crate::pipeline::document::Document;
use crate::pipeline::errors::PipelineError;

/// Plain text of a whole document, surrounding whitespace trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

pub trait TextExtractor: Send + Sync {
    fn extract(&self, document: &Document) -> Result<ExtractedText, PipelineError>;
}

/// `lopdf` page-by-page extraction with a whole-document `pdf-extract` fallback
/// for documents whose pages decode to no text at all.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, document: &Document) -> Result<ExtractedText, PipelineError> {
        self.extract_with_fallback(document, |bytes| {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())
        })
    }
}

impl PdfTextExtractor {
    /// lopdf decode errors are terminal; `fallback` only runs when every page
    /// decodes and the combined text is still empty.
    fn extract_with_fallback(
        &self,
        document: &Document,
        fallback: impl FnOnce(&[u8]) -> Result<String, String>,
    ) -> Result<ExtractedText, PipelineError> {
        let pdf = PdfDocument::load_mem(&document.bytes)
            .map_err(|e| PipelineError::UnreadablePdf(e.to_string()))?;

        let pages = pdf.get_pages();
        if pages.is_empty() {
            return Err(PipelineError::UnreadablePdf(
                "document has no pages".to_string(),
            ));
        }

        // BTreeMap keys: page numbers in ascending order
        let mut text = String::new();
        for page_number in pages.keys() {
            let page_text = pdf.extract_text(&[*page_number]).map_err(|e| {
                PipelineError::UnreadablePdf(format!("page {page_number}: {e}"))
            })?;
            text.push_str(&page_text);
        }

        let extracted = ExtractedText::new(text);
        if !extracted.as_str().is_empty() {
            debug!(
                "Extracted {} words from {} pages of {}",
                extracted.word_count(),
                pages.len(),
                document.filename
            );
            return Ok(extracted);
        }

        warn!(
            "No text decoded from {} via lopdf, falling back to pdf-extract",
            document.filename
        );
        let text = fallback(&document.bytes)
            .map_err(|e| PipelineError::UnreadablePdf(format!("pdf-extract failed: {e}")))?;
        Ok(ExtractedText::new(text))
    }
}
