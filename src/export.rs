//! CSV Export
//!
//! Builds the CSV text behind each indicator's download link and wraps it
//! in a `text/csv` data URI.
//!
//! Format: header row, then one line per row, cells joined with `,`,
//! lines joined with `\n` and no trailing newline. Cells are written
//! verbatim (no quoting); dates and numbers never contain separators.

use thiserror::Error;

use crate::series::Row;

/// Prefix of every generated download link
pub const CSV_DATA_URI_PREFIX: &str = "data:text/csv;charset=utf-8,";

/// Errors that can occur while building an export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render a header and rows as CSV text
pub fn csv_text<H: AsRef<str>>(header: &[H], rows: &[Row]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header.iter().map(AsRef::<str>::as_ref))?;
    for row in rows {
        writer.write_record(row.cells())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    let mut text = String::from_utf8(bytes)?;

    if text.ends_with('\n') {
        text.pop();
    }

    Ok(text)
}

/// Render a header and rows as a percent-encoded CSV data URI
pub fn csv_data_uri<H: AsRef<str>>(header: &[H], rows: &[Row]) -> Result<String, ExportError> {
    let text = csv_text(header, rows)?;
    Ok(format!("{}{}", CSV_DATA_URI_PREFIX, urlencoding::encode(&text)))
}

/// Decode a CSV data URI back to its text. Returns `None` for other URIs.
pub fn decode_csv_data_uri(uri: &str) -> Option<String> {
    let encoded = uri.strip_prefix(CSV_DATA_URI_PREFIX)?;
    urlencoding::decode(encoded).ok().map(|text| text.into_owned())
}
