//! PDF extractor: text layer first, page OCR as the fallback

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::ExtractedContent;
use crate::error::{DocsiftError, Result};
use crate::models::DocumentType;
use crate::ocr::{MistralOcrClient, OcrInputKind};
use crate::processing::rasterizer::PageRasterizer;

pub struct PdfExtractor;

impl PdfExtractor {
    pub async fn extract(
        path: &Path,
        ocr: &MistralOcrClient,
        rasterizer: &dyn PageRasterizer,
    ) -> Result<ExtractedContent> {
        let bytes = tokio::fs::read(path).await?;

        match Self::text_layer(&bytes) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(chars = text.len(), "Using embedded PDF text layer");
                return Ok(ExtractedContent::new(text, DocumentType::Pdf));
            }
            Ok(_) => info!("PDF has no text layer, falling back to OCR"),
            Err(e) => warn!("PDF text extraction failed, falling back to OCR: {}", e),
        }

        let text = Self::ocr_pages(path, ocr, rasterizer).await?;
        Ok(ExtractedContent::new(text, DocumentType::Pdf))
    }

    /// Text of every page, joined with newlines.
    ///
    /// The parser can panic on malformed input; that is reported as an
    /// extraction error like any other parse failure.
    pub fn text_layer(bytes: &[u8]) -> Result<String> {
        let pages = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| DocsiftError::extraction(DocumentType::Pdf, "PDF parser panicked"))?
        .map_err(|e| DocsiftError::extraction(DocumentType::Pdf, e.to_string()))?;

        Ok(pages.join("\n"))
    }

    async fn ocr_pages(
        path: &Path,
        ocr: &MistralOcrClient,
        rasterizer: &dyn PageRasterizer,
    ) -> Result<String> {
        // Dropped on every return path, which removes any page left behind.
        let work_dir = TempDir::new()?;

        let pages = rasterizer
            .rasterize(path, work_dir.path())
            .await
            .map_err(|e| DocsiftError::extraction(DocumentType::Pdf, e.to_string()))?;
        info!(pages = pages.len(), "Running OCR on rasterized PDF pages");

        let mut texts = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let page_number = index + 1;
            let result = match tokio::fs::read(page).await {
                Ok(bytes) => ocr.recognize(&bytes, OcrInputKind::Image).await,
                Err(e) => Err(e.into()),
            };

            if let Err(e) = tokio::fs::remove_file(page).await {
                debug!(page = page_number, "Could not remove page image: {}", e);
            }

            match result {
                Ok(text) if !text.trim().is_empty() => texts.push(text),
                Ok(_) => debug!(page = page_number, "OCR returned no text for page"),
                Err(e) => warn!(page = page_number, "OCR failed for PDF page, skipping it: {}", e),
            }
        }

        Ok(texts.join("\n"))
    }
}
