//! Series Model
//!
//! Turns the JSON arrays served by the series API into aligned
//! `(labels, values)` sequences, and formats values back to text for
//! tables and CSV exports.
//!
//! The API is not validated. Values are coerced the way a browser
//! `Number(..)` cast would coerce them, so a bad cell becomes `NaN` and
//! flows through to the chart instead of rejecting the whole response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One indicator's time series: labels and values, positionally aligned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Date labels, in server order
    pub labels: Vec<String>,
    /// Numeric values; `NaN` marks a value that could not be coerced
    pub values: Vec<f64>,
}

/// A single preview/export row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub date: String,
    /// `None` when the series has fewer values than labels
    pub value: Option<f64>,
}

impl Row {
    /// Cell texts for this row, in column order
    pub fn cells(&self) -> [String; 2] {
        [
            self.date.clone(),
            self.value.map(format_value).unwrap_or_default(),
        ]
    }
}

impl Series {
    /// Create a series from already-separated labels and values
    pub fn new(labels: Vec<String>, values: Vec<f64>) -> Self {
        Self { labels, values }
    }

    /// Build a series from an API response body.
    ///
    /// Returns `None` unless the body is a JSON array. Each element
    /// contributes its `date` field as the label and its coerced `value`
    /// field as the value.
    pub fn from_json(body: &Value) -> Option<Self> {
        let items = body.as_array()?;

        let mut labels = Vec::with_capacity(items.len());
        let mut values = Vec::with_capacity(items.len());

        for item in items {
            labels.push(coerce_label(item.get("date")));
            values.push(item.get("value").map(coerce_number).unwrap_or(f64::NAN));
        }

        Some(Self { labels, values })
    }

    /// Number of points (labels drive the row count)
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Pair each label with the value at the same position
    pub fn rows(&self) -> Vec<Row> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, date)| Row {
                date: date.clone(),
                value: self.values.get(i).copied(),
            })
            .collect()
    }
}

/// Coerce a JSON value to a number the way `Number(value)` does.
///
/// - numbers pass through
/// - strings are trimmed; empty means `0`, numeric text parses,
///   `0x`/`0o`/`0b` prefixes are integer literals, anything else is `NaN`
/// - `null` is `0`, booleans are `1`/`0`
/// - an empty array is `0`, a single-element array coerces its element
/// - objects are `NaN`
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_numeric_text(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [only] => match only {
                Value::Array(_) | Value::Object(_) => f64::NAN,
                Value::Null => 0.0,
                Value::Bool(_) => f64::NAN,
                other => coerce_number(other),
            },
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

/// Coerce a JSON value to a label string. Missing and `null` become empty.
pub fn coerce_label(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.as_f64().map(format_value).unwrap_or_else(|| n.to_string()),
        Some(other) => other.to_string(),
    }
}

fn parse_numeric_text(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let lower = s.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }

    // Rust accepts "inf"/"nan" spellings that a cast would reject
    if lower.contains("inf") || lower.contains("nan") {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Render a number as text the way a browser stringifies it:
/// `11.0` is `11`, `-0` is `0`, non-finite values are `NaN`/`Infinity`,
/// and very large or very small magnitudes use exponent notation.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exp = format!("{:e}", value);
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        };
    }

    format!("{}", value)
}
