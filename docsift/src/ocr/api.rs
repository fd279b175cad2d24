use std::time::Duration;

use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::OcrConfig;
use crate::error::{DocsiftError, Result};

/// Value of the `type` query parameter sent with each upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrInputKind {
    Image,
}

impl OcrInputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrInputKind::Image => "image",
        }
    }
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MistralOcrClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MistralOcrClient {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| DocsiftError::Config("MISTRAL_API_KEY is required for OCR".to_string()))?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| DocsiftError::Ocr(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/ocr", self.base_url)
    }

    /// Upload one image and return the recognized text.
    ///
    /// A 200 response yields the `text` field of the body, or an empty string
    /// when the field is missing. Every other status is reported as
    /// [`DocsiftError::OcrStatus`]; transport failures surface as
    /// [`DocsiftError::Http`]. No retries are attempted.
    pub async fn recognize(&self, image_bytes: &[u8], kind: OcrInputKind) -> Result<String> {
        let file_name = upload_file_name(image_bytes);
        let file_part = multipart::Part::bytes(image_bytes.to_vec())
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| DocsiftError::Ocr(format!("Invalid MIME type: {e}")))?;
        let form = multipart::Form::new().part("file", file_part);

        let url = self.endpoint();
        debug!(%url, bytes = image_bytes.len(), kind = kind.as_str(), "Sending OCR request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(&[("type", kind.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Error processing file with Mistral OCR: {}", e);
                DocsiftError::Http(e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            error!("Error with Mistral OCR: {} - {}", status.as_u16(), body);
            return Err(DocsiftError::OcrStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: OcrResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse Mistral OCR response: {}", e);
            DocsiftError::Json(e)
        })?;

        Ok(parsed.text.unwrap_or_default())
    }
}

/// Filename for the multipart part, with an extension sniffed from the bytes.
fn upload_file_name(bytes: &[u8]) -> String {
    let ext = image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("bin");
    format!("upload.{ext}")
}
