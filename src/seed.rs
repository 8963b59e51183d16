//! Seed Data
//!
//! Optional fallback series rendered before the first network cycle
//! finishes. The seed file is a JSON object keyed by indicator key:
//!
//! ```json
//! {
//!   "selic": { "labels": ["2024-01-01"], "values": [11.25] },
//!   "focus": { "labels": ["2024-01-01"], "values": ["3.9"] }
//! }
//! ```
//!
//! An entry is used only when both `labels` and `values` are present.
//! Values are coerced like API values.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::indicators;
use crate::series::{coerce_label, coerce_number, Series};

#[derive(Debug, Deserialize)]
struct SeedEntry {
    labels: Option<Vec<Value>>,
    values: Option<Vec<Value>>,
}

/// Fallback series per indicator key
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    series: HashMap<String, Series>,
}

impl SeedData {
    /// Seed data with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse seed data from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, SeedError> {
        let entries: HashMap<String, SeedEntry> =
            serde_json::from_str(text).map_err(|e| SeedError::Parse(e.to_string()))?;

        let mut series = HashMap::new();
        for (key, entry) in entries {
            if indicators::find(&key).is_none() {
                tracing::warn!(indicator = %key, "Seed entry for unknown indicator, skipping");
                continue;
            }

            let (Some(labels), Some(values)) = (entry.labels, entry.values) else {
                tracing::debug!(indicator = %key, "Seed entry incomplete, skipping");
                continue;
            };

            series.insert(
                key,
                Series::new(
                    labels.iter().map(|l| coerce_label(Some(l))).collect(),
                    values.iter().map(coerce_number).collect(),
                ),
            );
        }

        Ok(Self { series })
    }

    /// Load seed data from a file
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let content = std::fs::read_to_string(path).map_err(|e| SeedError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_json_str(&content).map_err(|e| match e {
            SeedError::Parse(error) => SeedError::File {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Add or replace one indicator's seed series
    pub fn insert(&mut self, key: &str, series: Series) {
        self.series.insert(key.to_string(), series);
    }

    pub fn get(&self, key: &str) -> Option<&Series> {
        self.series.get(key)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Seed loading errors
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse seed file {path:?}: {error}")]
    File { path: PathBuf, error: String },

    #[error("Failed to parse seed data: {0}")]
    Parse(String),
}
