//! Delimited-text reader for analysis datasets.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::{DataTable, SourceMetadata};
use crate::error::{AssayError, Result};

/// Candidate delimiters, in the order ties are broken (last wins).
const CANDIDATES: [u8; 4] = [b',', b';', b'|', b'\t'];

/// Non-blank lines sampled for delimiter detection.
const SAMPLE_LINES: usize = 10;

/// How a dataset file is split into a table.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Field delimiter; detected from the content when unset.
    pub delimiter: Option<u8>,
    pub has_header: bool,
    /// Stop after this many data rows.
    pub max_rows: Option<usize>,
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Reads CSV, TSV and similar files into a [`DataTable`].
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Read `path` and attach its hash, size and detected format.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<DataTable> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| AssayError::DatasetLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };
        let table = self.parse_bytes(&contents, delimiter)?;

        let format = format_name(delimiter);
        debug!(
            path = %path.display(),
            format,
            rows = table.row_count(),
            columns = table.column_count(),
            "Parsed dataset"
        );

        let source = SourceMetadata::new(
            path.to_path_buf(),
            format!("sha256:{:x}", Sha256::digest(&contents)),
            contents.len() as u64,
            format.to_string(),
        );
        Ok(table.with_source(source))
    }

    /// Split `bytes` on a known delimiter.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };

        let rows = reader
            .records()
            .take(self.config.max_rows.unwrap_or(usize::MAX))
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;

        if !self.config.has_header {
            let width = rows
                .first()
                .map(Vec::len)
                .ok_or_else(|| AssayError::EmptyData("No data rows found".to_string()))?;
            headers = (1..=width).map(|i| format!("column_{i}")).collect();
        }

        if headers.iter().all(String::is_empty) {
            return Err(AssayError::EmptyData("No columns found".to_string()));
        }

        DataTable::new(headers, rows)
    }
}

fn format_name(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

/// Pick the candidate that splits the sampled lines into the same number
/// of fields most often, preferring more fields. Falls back to a comma.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SAMPLE_LINES)
        .collect();

    if lines.is_empty() {
        return Err(AssayError::EmptyData("No lines to analyze".to_string()));
    }

    let best = CANDIDATES
        .iter()
        .filter_map(|&delimiter| {
            let counts: Vec<usize> = lines.iter().map(|l| unquoted_count(l, delimiter)).collect();
            let first = counts[0];
            (first > 0).then(|| {
                let agreeing = counts.iter().filter(|&&c| c == first).count();
                ((agreeing, first), delimiter)
            })
        })
        .max_by_key(|(score, _)| *score);

    Ok(best.map_or(b',', |(_, delimiter)| delimiter))
}

/// Occurrences of `delimiter` outside double quotes.
fn unquoted_count(line: &str, delimiter: u8) -> usize {
    let delimiter = delimiter as char;
    line.chars()
        .fold((0, false), |(count, quoted), c| match c {
            '"' => (count, !quoted),
            c if c == delimiter && !quoted => (count + 1, quoted),
            _ => (count, quoted),
        })
        .0
}
