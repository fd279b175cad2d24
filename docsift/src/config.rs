use std::env;

pub const DEFAULT_OCR_BASE_URL: &str = "https://api.mistral.ai/v1";

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub ocr: OcrConfig,
    pub pdf: PdfConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Request timeout; `None` keeps the HTTP client's default.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct PdfConfig {
    pub rasterizer_bin: String,
    pub render_dpi: u32,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub preview_chars: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OCR_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            rasterizer_bin: "pdftoppm".to_string(),
            render_dpi: 200,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            preview_chars: 2000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            ocr: OcrConfig {
                api_key: env::var("MISTRAL_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                base_url: env::var("OCR_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| DEFAULT_OCR_BASE_URL.to_string()),
                timeout_secs: parse_env_opt("OCR_TIMEOUT"),
            },
            pdf: PdfConfig {
                rasterizer_bin: env::var("PDFTOPPM_PATH")
                    .unwrap_or_else(|_| "pdftoppm".to_string()),
                render_dpi: parse_env_or("PDF_RENDER_DPI", 200),
            },
            output: OutputConfig {
                preview_chars: parse_env_or("PREVIEW_CHARS", 2000),
            },
        }
    }

    /// Config pointing at a specific OCR endpoint, used by tests and embedders.
    pub fn with_ocr(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            ocr: OcrConfig {
                api_key: Some(api_key.into()),
                base_url: base_url.into(),
                timeout_secs: None,
            },
            pdf: PdfConfig::default(),
            output: OutputConfig::default(),
        }
    }
}
