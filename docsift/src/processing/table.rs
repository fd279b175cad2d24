//! Plain-text rendering of a sheet, laid out like a printed DataFrame.
//!
//! ```text
//!     Product  Price     Category
//! 0  Widget A    100  Electronics
//! 1  Widget B    200        Tools
//! ```
//!
//! The first row is the header. Blank header cells become `Unnamed: <i>`,
//! blank data cells print as `NaN`, and every column is right-aligned to its
//! widest cell. The row index column is left-aligned.

const COLUMN_GAP: &str = "  ";
const MISSING: &str = "NaN";

/// A sheet header line followed by the sheet's table.
pub fn render_sheet(name: &str, rows: &[Vec<String>]) -> String {
    format!("=== Sheet: {name} ===\n{}", render_table(rows))
}

pub fn render_table(rows: &[Vec<String>]) -> String {
    let Some((header_row, data)) = rows.split_first() else {
        return "Empty DataFrame\nColumns: []\nIndex: []".to_string();
    };

    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let headers: Vec<String> = (0..cols)
        .map(|i| match header_row.get(i) {
            Some(cell) if !cell.trim().is_empty() => cell.clone(),
            _ => format!("Unnamed: {i}"),
        })
        .collect();

    if data.is_empty() {
        return format!(
            "Empty DataFrame\nColumns: [{}]\nIndex: []",
            headers.join(", ")
        );
    }

    let cells: Vec<Vec<&str>> = data
        .iter()
        .map(|row| {
            (0..cols)
                .map(|i| match row.get(i) {
                    Some(cell) if !cell.is_empty() => cell.as_str(),
                    _ => MISSING,
                })
                .collect()
        })
        .collect();

    let index_labels: Vec<String> = (0..data.len()).map(|i| i.to_string()).collect();
    let index_width = index_labels.iter().map(|l| width(l)).max().unwrap_or(0);

    let col_widths: Vec<usize> = (0..cols)
        .map(|c| {
            cells
                .iter()
                .map(|row| width(row[c]))
                .chain(std::iter::once(width(&headers[c])))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(data.len() + 1);

    let mut header_line = " ".repeat(index_width);
    for (header, w) in headers.iter().zip(&col_widths) {
        header_line.push_str(COLUMN_GAP);
        header_line.push_str(&pad_left(header, *w));
    }
    lines.push(header_line);

    for (label, row) in index_labels.iter().zip(&cells) {
        let mut line = pad_right(label, index_width);
        for (cell, w) in row.iter().zip(&col_widths) {
            line.push_str(COLUMN_GAP);
            line.push_str(&pad_left(cell, *w));
        }
        lines.push(line);
    }

    lines.join("\n")
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn pad_left(s: &str, w: usize) -> String {
    format!("{}{}", " ".repeat(w.saturating_sub(width(s))), s)
}

fn pad_right(s: &str, w: usize) -> String {
    format!("{}{}", s, " ".repeat(w.saturating_sub(width(s))))
}
