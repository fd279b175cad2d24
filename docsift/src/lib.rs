//! Plain-text extraction for PDFs, images and office documents.
//!
//! [`processing::DocumentProcessor`] routes a file to the extractor for its
//! extension. Image content (scanned PDF pages, pictures, embedded figures)
//! is recognized through a remote OCR service.

pub mod config;
pub mod error;
pub mod models;
pub mod ocr;
pub mod processing;

pub use config::Config;
pub use error::{DocsiftError, Result};
pub use processing::{DocumentProcessor, ExtractedContent};
