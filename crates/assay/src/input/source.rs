//! Tabular dataset and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};

/// Where a dataset came from, captured at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub path: PathBuf,
    /// `sha256:` followed by the lowercase hex digest of the raw bytes.
    pub hash: String,
    pub size_bytes: u64,
    /// `csv`, `tsv`, `psv`, `csv-semicolon` or `delimited`.
    pub format: String,
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    pub fn new(path: PathBuf, hash: String, size_bytes: u64, format: String) -> Self {
        Self {
            path,
            hash,
            size_bytes,
            format,
            loaded_at: Utc::now(),
        }
    }

    /// Final path component, or an empty string for a bare root.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// In-memory tabular dataset.
///
/// Column names are unique and keep their file order; rows keep their
/// file order too.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: IndexMap<String, usize>,
    rows: Vec<Vec<String>>,
    source: Option<SourceMetadata>,
}

impl DataTable {
    /// Build a table, rejecting duplicate column names.
    ///
    /// Rows shorter than the header are padded with empty cells and longer
    /// rows are truncated.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut columns = IndexMap::with_capacity(headers.len());
        for (position, name) in headers.into_iter().enumerate() {
            if columns.contains_key(&name) {
                return Err(AssayError::DuplicateColumn(name));
            }
            columns.insert(name, position);
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Ok(Self {
            columns,
            rows,
            source: None,
        })
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach metadata about where the table came from.
    pub fn with_source(mut self, source: SourceMetadata) -> Self {
        self.source = Some(source);
        self
    }

    /// Metadata about the originating file, if the table came from one.
    pub fn source(&self) -> Option<&SourceMetadata> {
        self.source.as_ref()
    }

    /// Column names in order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Data rows, header excluded.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Cells of column `index`, top to bottom. Empty past the last column.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map_or("", String::as_str))
    }

    pub fn column_by_name(&self, name: &str) -> Option<Vec<&str>> {
        self.column_index(name)
            .map(|index| self.column_values(index).collect())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(|r| r.as_slice())
    }
}
