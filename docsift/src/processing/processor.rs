use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::extractors::{
    CsvExtractor, DocxExtractor, ExtractedContent, ImageExtractor, PdfExtractor, PptxExtractor,
    XlsxExtractor,
};
use super::rasterizer::{PageRasterizer, PdftoppmRasterizer};
use crate::config::Config;
use crate::error::{DocsiftError, Result};
use crate::models::DocumentType;
use crate::ocr::MistralOcrClient;

/// Routes a file to the extractor for its extension.
///
/// Built once per run; it owns the OCR client and the page rasterizer used
/// by the PDF fallback.
pub struct DocumentProcessor {
    ocr: MistralOcrClient,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl DocumentProcessor {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            ocr: MistralOcrClient::new(&config.ocr)?,
            rasterizer: Arc::new(PdftoppmRasterizer::new(&config.pdf)),
        })
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub async fn process_file(&self, path: &Path) -> Result<ExtractedContent> {
        if !path.is_file() {
            return Err(DocsiftError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let Some(doc_type) = DocumentType::from_extension(&ext) else {
            warn!(path = %path.display(), extension = %ext, "Unsupported file type");
            return Err(DocsiftError::UnsupportedType(ext));
        };

        info!(path = %path.display(), %doc_type, "Processing file");

        let mut content = match doc_type {
            DocumentType::Pdf => {
                PdfExtractor::extract(path, &self.ocr, self.rasterizer.as_ref()).await?
            }
            DocumentType::Image => ImageExtractor::extract(path, &self.ocr).await?,
            DocumentType::Docx => {
                let bytes = tokio::fs::read(path).await?;
                DocxExtractor::extract(&bytes, &self.ocr).await?
            }
            DocumentType::Pptx => {
                let bytes = tokio::fs::read(path).await?;
                PptxExtractor::extract(&bytes, &self.ocr).await?
            }
            DocumentType::Xlsx => {
                let bytes = tokio::fs::read(path).await?;
                XlsxExtractor::extract(&bytes)?
            }
            DocumentType::Csv => {
                let bytes = tokio::fs::read(path).await?;
                let sheet_name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                CsvExtractor::extract(&bytes, &sheet_name)?
            }
        };

        info!(%doc_type, words = content.word_count, "Extraction finished");

        content.source_path = Some(path.display().to_string());
        Ok(content)
    }
}
