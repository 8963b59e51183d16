//! Preview Tables
//!
//! A preview table shows the first rows of a series and a note saying how
//! many of the total rows are visible.

use serde::Serialize;

use crate::series::Row;

/// Rendered content of a table container
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows actually shown
    pub shown: usize,
    /// Rows available in the series
    pub total: usize,
}

impl PreviewTable {
    /// Build a preview of at most `max_rows` rows
    pub fn build<H: AsRef<str>>(headers: &[H], rows: &[Row], max_rows: usize) -> Self {
        let visible: Vec<Vec<String>> = rows
            .iter()
            .take(max_rows)
            .map(|row| row.cells().to_vec())
            .collect();

        Self {
            headers: headers
                .iter()
                .map(|h| AsRef::<str>::as_ref(h).to_string())
                .collect(),
            shown: visible.len(),
            total: rows.len(),
            rows: visible,
        }
    }

    /// Row-count note displayed above the table
    pub fn note(&self) -> String {
        format!("Mostrando {} de {} linhas.", self.shown, self.total)
    }
}
