use std::path::Path;

use super::ExtractedContent;
use crate::error::Result;
use crate::models::DocumentType;
use crate::ocr::{MistralOcrClient, OcrInputKind};

pub struct ImageExtractor;

impl ImageExtractor {
    /// Extract text from an image file using remote OCR
    ///
    /// # Arguments
    /// * `path` - Image file (JPEG, PNG, BMP, GIF or TIFF)
    /// * `ocr` - OCR client used for recognition
    ///
    /// # Returns
    /// ExtractedContent with the recognized text, which may be empty
    pub async fn extract(path: &Path, ocr: &MistralOcrClient) -> Result<ExtractedContent> {
        let bytes = tokio::fs::read(path).await?;
        Self::extract_bytes(&bytes, ocr).await
    }

    /// Extract text from image bytes that are already in memory
    pub async fn extract_bytes(bytes: &[u8], ocr: &MistralOcrClient) -> Result<ExtractedContent> {
        let text = ocr.recognize(bytes, OcrInputKind::Image).await?;
        Ok(ExtractedContent::new(text, DocumentType::Image))
    }
}
