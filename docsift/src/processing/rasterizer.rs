use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::config::PdfConfig;
use crate::error::{DocsiftError, Result};

/// Renders the pages of a PDF to image files.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Write one image per page into `out_dir` and return their paths in
    /// page order.
    async fn rasterize(&self, pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>>;
}

/// Rasterizer backed by poppler's `pdftoppm` binary.
pub struct PdftoppmRasterizer {
    binary: String,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(config: &PdfConfig) -> Self {
        Self {
            binary: config.rasterizer_bin.clone(),
            dpi: config.render_dpi,
        }
    }
}

#[async_trait]
impl PageRasterizer for PdftoppmRasterizer {
    async fn rasterize(&self, pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let prefix = out_dir.join("page");
        debug!(pdf = %pdf_path.display(), dpi = self.dpi, "Rasterizing PDF pages");

        let output = Command::new(&self.binary)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .await
            .map_err(|e| DocsiftError::Rasterize(format!("Failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocsiftError::Rasterize(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let pages = collect_page_images(out_dir).await?;
        if pages.is_empty() {
            return Err(DocsiftError::Rasterize(format!(
                "{} produced no page images",
                self.binary
            )));
        }

        Ok(pages)
    }
}

/// Page images named `page-<n>.png` in `dir`, sorted by page number.
///
/// pdftoppm zero-pads the number to the width of the page count, so the
/// number is parsed rather than compared as text.
pub async fn collect_page_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut pages: Vec<(u32, PathBuf)> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(n) = page_number(&path) {
            pages.push((n, path));
        }
    }

    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (prefix, number) = stem.rsplit_once('-')?;
    if prefix != "page" {
        return None;
    }
    number.parse().ok()
}
