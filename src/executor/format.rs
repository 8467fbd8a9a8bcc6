//! Text rendering of statement results.

use comfy_table::{Cell, Table, presets};

/// Renders headers and rows as a fixed-width `+---+` table.
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.load_preset(presets::ASCII_FULL_CONDENSED);
    table.set_header(headers.iter().map(Cell::new));
    for row in rows {
        table.add_row(row.iter().map(Cell::new));
    }
    table.to_string()
}

pub fn rows_returned(count: usize) -> String {
    format!("Query OK: {} rows returned", count)
}
