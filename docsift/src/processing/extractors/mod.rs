use crate::models::DocumentType;

#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub text: String,
    pub doc_type: DocumentType,
    pub word_count: i32,
    pub source_path: Option<String>,
}

impl ExtractedContent {
    pub fn new(text: String, doc_type: DocumentType) -> Self {
        let word_count = count_words(&text);
        Self {
            text,
            doc_type,
            word_count,
            source_path: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Marker placed before text recognized inside an embedded image.
pub const IMAGE_CONTENT_MARKER: &str = "[IMAGE CONTENT]";

pub(crate) fn count_words(text: &str) -> i32 {
    text.split_whitespace().count() as i32
}

pub mod csv;
pub mod docx;
pub mod image;
mod ooxml;
pub mod pdf;
pub mod pptx;
pub mod xlsx;

pub use self::csv::CsvExtractor;
pub use self::docx::DocxExtractor;
pub use self::image::ImageExtractor;
pub use ooxml::Fragment;
pub use pdf::PdfExtractor;
pub use pptx::PptxExtractor;
pub use xlsx::XlsxExtractor;
