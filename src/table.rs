use std::fmt::Write as _;

use crate::{
    data::{ColumnType, Value},
    frame::Frame,
};

const NULL_MARKER: &str = "null";
const COLUMN_GAP: &str = "  ";

/// Renders up to `limit` rows of `frame` as an aligned text table.
/// Numeric columns are right-aligned; nulls print as `null`.
pub fn render_frame(frame: &Frame, limit: usize) -> String {
    let headers = frame.column_names();
    let numeric = frame
        .columns()
        .iter()
        .map(|c| matches!(c.datatype, ColumnType::Integer | ColumnType::Float))
        .collect::<Vec<_>>();
    let cells = frame
        .rows()
        .iter()
        .take(limit)
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Some(value) => sanitize_cell(value),
                    None => NULL_MARKER.to_string(),
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in &cells {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| h.as_str()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths, &[]));
    let separators = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let separator_cells = separators.iter().map(|s| s.as_str()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator_cells, &widths, &[]));
    for row in &cells {
        let row_cells = row.iter().map(|s| s.as_str()).collect::<Vec<_>>();
        let _ = writeln!(output, "{}", format_row(&row_cells, &widths, &numeric));
    }
    output
}

fn format_row(values: &[&str], widths: &[usize], right_align: &[bool]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, &width))| {
            if right_align.get(idx).copied().unwrap_or(false) {
                format!("{value:>width$}")
            } else {
                format!("{value:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn sanitize_cell(value: &Value) -> String {
    value
        .as_display()
        .chars()
        .map(|ch| match ch {
            '\n' | '\r' | '\t' => ' ',
            other => other,
        })
        .collect()
}
