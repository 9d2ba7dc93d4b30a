//! Plain-text rendering of [`Table`]s for terminal output.

use crate::table::{Cell, Table};

/// Format a floating-point number with a fixed number of decimal places.
///
/// # Examples
///
/// ```
/// use irradiance_core::formatting::format_number;
///
/// assert_eq!(format_number(1.23456, 3), "1.235");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-0.5, 1), "-0.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    format!("{:.prec$}", value, prec = decimals)
}

/// Format one cell for display. Missing values render as an empty string.
pub fn format_cell(cell: &Cell, decimals: usize) -> String {
    match cell {
        Cell::Int(v) => v.to_string(),
        Cell::Float(v) => format_number(*v, decimals),
        Cell::Text(s) => s.clone(),
        Cell::Missing => String::new(),
    }
}

/// Render `table` as right-aligned columns under a title line.
///
/// # Examples
///
/// ```
/// use irradiance_core::formatting::render_table;
/// use irradiance_core::table::{Cell, Table};
///
/// let mut table = Table::new(vec!["Month".to_string()]);
/// table.push_positional(vec![Cell::Int(1)]);
/// let text = render_table("Months", &table, 2);
/// assert!(text.starts_with("Months\n"));
/// ```
pub fn render_table(title: &str, table: &Table, decimals: usize) -> String {
    let header: Vec<String> = std::iter::once(table.index_name.clone())
        .chain(table.columns.iter().cloned())
        .collect();

    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.index.clone())
                .chain(row.cells.iter().map(|c| format_cell(c, decimals)))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for line in &body {
        for (w, field) in widths.iter_mut().zip(line) {
            *w = (*w).max(field.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&join_padded(&header, &widths));
    out.push('\n');
    if body.is_empty() {
        out.push_str("(no rows)\n");
    }
    for line in &body {
        out.push_str(&join_padded(line, &widths));
        out.push('\n');
    }
    out
}

fn join_padded(fields: &[String], widths: &[usize]) -> String {
    fields
        .iter()
        .zip(widths)
        .map(|(f, w)| format!("{:>width$}", f, width = w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
