//! Remote OCR
//!
//! Text recognition for image content is delegated to the Mistral OCR API.
//! The client only reproduces the calling contract of that service:
//! one image per synchronous request, bearer-token authentication, a
//! multipart binary body and a `type` query parameter.
//!
//! # Configuration
//!
//! Controlled via `OcrConfig` (see `config.rs`):
//! - `api_key`: bearer token, read from `MISTRAL_API_KEY`
//! - `base_url`: endpoint root, `https://api.mistral.ai/v1` unless overridden
//! - `timeout_secs`: optional request timeout
//!
//! # Usage
//!
//! ```rust,ignore
//! let ocr = MistralOcrClient::new(&config.ocr)?;
//! let text = ocr.recognize(&image_bytes, OcrInputKind::Image).await?;
//! ```

mod api;

pub use api::{MistralOcrClient, OcrInputKind};
