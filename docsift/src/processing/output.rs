use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

const OUTPUT_SUFFIX: &str = "_extracted.txt";

/// `<dir>/report.pdf` -> `<dir>/report_extracted.txt`
pub fn output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(OUTPUT_SUFFIX);
    input.with_file_name(name)
}

/// Write extracted text next to the input file, replacing any earlier result.
pub async fn write_output(input: &Path, text: &str) -> Result<PathBuf> {
    let path = output_path(input);
    tokio::fs::write(&path, text.as_bytes()).await?;
    debug!(path = %path.display(), bytes = text.len(), "Wrote extracted text");
    Ok(path)
}

/// The first `limit` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
