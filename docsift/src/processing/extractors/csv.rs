use super::ExtractedContent;
use crate::error::{DocsiftError, Result};
use crate::models::DocumentType;
use crate::processing::table::render_sheet;

/// Extractor for CSV files, rendered as a single sheet
pub struct CsvExtractor;

impl CsvExtractor {
    /// Extract CSV bytes as one sheet called `sheet_name` (the file stem).
    pub fn extract(bytes: &[u8], sheet_name: &str) -> Result<ExtractedContent> {
        let rows = Self::read_rows(bytes)?;
        let text = render_sheet(sheet_name, &rows);

        Ok(ExtractedContent::new(text, DocumentType::Csv))
    }

    /// Parse CSV bytes into rows, header row first.
    pub fn read_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
        let bytes = strip_bom(bytes);

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(DocsiftError::extraction(DocumentType::Csv, "Empty CSV file"));
        }

        let delimiter = detect_delimiter(bytes);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| {
                DocsiftError::extraction(DocumentType::Csv, format!("Failed to read CSV record: {e}"))
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(rows)
    }
}

/// Strip UTF-8 BOM if present
fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)
}

/// Pick the delimiter that gives the most consistent column count
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let candidates = [b',', b';', b'\t'];
    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delimiter in &candidates {
        let score = evaluate_delimiter(bytes, delimiter);
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

/// Higher is better. Only the first few lines are inspected.
fn evaluate_delimiter(bytes: &[u8], delimiter: u8) -> usize {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let column_counts: Vec<usize> = reader
        .records()
        .take(6)
        .filter_map(|r| r.ok())
        .map(|record| record.len())
        .collect();

    let Some(&first_count) = column_counts.first() else {
        return 0;
    };

    let consistent = column_counts.iter().all(|&c| c == first_count);
    let has_multiple_columns = first_count > 1;

    if consistent && has_multiple_columns {
        first_count * 10
    } else if has_multiple_columns {
        first_count
    } else {
        0
    }
}
