use super::ExtractedContent;
use crate::error::{DocsiftError, Result};
use crate::models::DocumentType;
use crate::processing::table::render_sheet;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::warn;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Extractor for `.xlsx` and `.xls` workbooks
pub struct XlsxExtractor;

impl XlsxExtractor {
    const MAX_ROWS: usize = 100_000;

    /// Render every worksheet in workbook order.
    pub fn extract(bytes: &[u8]) -> Result<ExtractedContent> {
        let sheets = Self::read_sheets(bytes)?;
        let text = sheets
            .iter()
            .map(|(name, rows)| render_sheet(name, rows))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ExtractedContent::new(text, DocumentType::Xlsx))
    }

    /// Sheet names paired with their cell rows, header row first.
    pub fn read_sheets(bytes: &[u8]) -> Result<Vec<(String, Vec<Vec<String>>)>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
            DocsiftError::extraction(DocumentType::Xlsx, format!("Workbook parse error: {e}"))
        })?;

        let mut sheets = Vec::new();

        for (name, range) in workbook.worksheets() {
            let (rows, cols) = range.get_size();

            // Guard against pathological files with excessive rows
            if rows > Self::MAX_ROWS {
                warn!(
                    sheet = %name,
                    rows,
                    "Sheet truncated to {} rows",
                    Self::MAX_ROWS
                );
            }

            let table_rows: Vec<Vec<String>> = range
                .rows()
                .take(Self::MAX_ROWS)
                .map(|row| {
                    (0..cols)
                        .map(|c| Self::format_cell_value(row.get(c)))
                        .collect()
                })
                .collect();

            sheets.push((name, table_rows));
        }

        Ok(sheets)
    }

    fn format_cell_value(cell: Option<&Data>) -> String {
        match cell {
            Some(Data::String(s)) => s.clone(),
            Some(Data::Int(i)) => i.to_string(),
            Some(Data::Float(f)) => {
                let s = format!("{f}");
                if s.contains('.') {
                    s.trim_end_matches('0').trim_end_matches('.').to_string()
                } else {
                    s
                }
            }
            Some(Data::Bool(b)) => b.to_string(),
            Some(Data::DateTime(dt)) => match dt.as_datetime() {
                Some(datetime) => datetime.format(DATETIME_FORMAT).to_string(),
                None => dt.to_string(),
            },
            Some(Data::DateTimeIso(dt)) => dt.to_string(),
            Some(Data::DurationIso(d)) => d.to_string(),
            Some(Data::Empty) | None => String::new(),
            _ => String::new(),
        }
    }
}
