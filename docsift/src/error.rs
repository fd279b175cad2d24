use thiserror::Error;

use crate::models::DocumentType;

#[derive(Error, Debug)]
pub enum DocsiftError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Error extracting text from {format}: {message}")]
    Extraction {
        format: DocumentType,
        message: String,
    },

    #[error("OCR service returned {status}: {body}")]
    OcrStatus { status: u16, body: String },

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Rasterization error: {0}")]
    Rasterize(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocsiftError {
    pub fn extraction(format: DocumentType, message: impl Into<String>) -> Self {
        Self::Extraction {
            format,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocsiftError>;
