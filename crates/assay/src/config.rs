//! Analysis configuration and the provider that reads it.
//!
//! The context never parses configuration itself; it asks a
//! [`ConfigProvider`] for an [`AnalysisConfig`]. [`JsonConfigProvider`] is the
//! default provider and reads a JSON document such as:
//!
//! ```json
//! {
//!   "output_dir": "output",
//!   "template": "binary",
//!   "data": { "path": "scores.csv", "delimiter": ",", "max_rows": 5000 }
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AssayError, Result};
use crate::input::ParserConfig;

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_has_header() -> bool {
    true
}

/// Where the dataset lives and how to read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the delimited data file.
    pub path: PathBuf,
    /// Field delimiter (None = auto-detect).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    /// Whether the first row holds column names.
    #[serde(default = "default_has_header")]
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
}

impl DataConfig {
    /// Create a data section pointing at a file, other options default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: None,
            has_header: true,
            max_rows: None,
        }
    }

    /// Parser settings for this data section.
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            delimiter: self.delimiter.map(|c| c as u8),
            has_header: self.has_header,
            max_rows: self.max_rows,
            ..ParserConfig::default()
        }
    }
}

/// Configuration for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<String>,

    data: DataConfig,

    /// The file this config was read from, when it came from one.
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Create a config reading data from `data_path`, writing to `./output`.
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: default_output_dir(),
            template: None,
            data: DataConfig::new(data_path),
            source: None,
        }
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the report template identifier.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Replace the data section.
    pub fn with_data(mut self, data: DataConfig) -> Self {
        self.data = data;
        self
    }

    /// Directory that receives analysis artifacts.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Template identifier requested by the config, if any.
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn data(&self) -> &DataConfig {
        &self.data
    }

    /// Path of the config file this was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Resolve relative paths against the config file's directory.
    fn anchor(mut self, source: &Path) -> Self {
        let base = source.parent().unwrap_or_else(|| Path::new(""));
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
        if self.data.path.is_relative() {
            self.data.path = base.join(&self.data.path);
        }
        self.source = Some(source.to_path_buf());
        self
    }

    fn validate(&self, source: &Path) -> Result<()> {
        if let Some(delimiter) = self.data.delimiter {
            if !delimiter.is_ascii() {
                return Err(AssayError::ConfigLoad {
                    path: source.to_path_buf(),
                    message: format!("delimiter '{}' is not a single-byte character", delimiter),
                });
            }
        }
        Ok(())
    }
}

/// Produces an [`AnalysisConfig`] from a configuration path.
pub trait ConfigProvider: Send + Sync {
    fn load_config(&self, path: &Path) -> Result<AnalysisConfig>;
}

impl<F> ConfigProvider for F
where
    F: Fn(&Path) -> Result<AnalysisConfig> + Send + Sync,
{
    fn load_config(&self, path: &Path) -> Result<AnalysisConfig> {
        self(path)
    }
}

/// Reads configuration from a JSON file.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConfigProvider;

impl ConfigProvider for JsonConfigProvider {
    fn load_config(&self, path: &Path) -> Result<AnalysisConfig> {
        let contents = fs::read_to_string(path).map_err(|e| AssayError::ConfigLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config: AnalysisConfig =
            serde_json::from_str(&contents).map_err(|e| AssayError::ConfigLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        config.validate(path)?;
        let config = config.anchor(path);

        debug!(
            config = %path.display(),
            data = %config.data.path.display(),
            output_dir = %config.output_dir.display(),
            "Loaded config"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"output_dir": "reports", "data": {"path": "data/scores.csv"}}"#,
        );

        let config = JsonConfigProvider.load_config(&path).unwrap();

        assert_eq!(config.output_dir(), dir.path().join("reports"));
        assert_eq!(config.data().path, dir.path().join("data/scores.csv"));
        assert_eq!(config.source(), Some(path.as_path()));
        assert!(config.data().has_header);
        assert_eq!(config.template(), None);
    }

    #[test]
    fn test_load_keeps_absolute_paths() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("abs.csv");
        let body = serde_json::json!({ "data": { "path": data } }).to_string();
        let path = write_config(&dir, &body);

        let config = JsonConfigProvider.load_config(&path).unwrap();

        assert_eq!(config.data().path, data);
        assert_eq!(config.output_dir(), dir.path().join("output"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = JsonConfigProvider
            .load_config(Path::new("/nonexistent/config.json"))
            .unwrap_err();
        assert!(matches!(err, AssayError::ConfigLoad { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "{ not json");

        let err = JsonConfigProvider.load_config(&path).unwrap_err();
        assert!(matches!(err, AssayError::ConfigLoad { path: ref p, .. } if p == &path));
    }

    #[test]
    fn test_load_rejects_multibyte_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"data": {"path": "d.csv", "delimiter": "§"}}"#);

        let err = JsonConfigProvider.load_config(&path).unwrap_err();
        assert!(err.to_string().contains("single-byte"));
    }

    #[test]
    fn test_parser_config_from_data_section() {
        let data = DataConfig {
            delimiter: Some(';'),
            has_header: false,
            max_rows: Some(10),
            ..DataConfig::new("x.csv")
        };
        let parser = data.parser_config();

        assert_eq!(parser.delimiter, Some(b';'));
        assert!(!parser.has_header);
        assert_eq!(parser.max_rows, Some(10));
    }

    #[test]
    fn test_closure_provider() {
        let provider = |_: &Path| -> Result<AnalysisConfig> {
            Ok(AnalysisConfig::new("data.csv").with_template("binary"))
        };
        let config = provider.load_config(Path::new("ignored")).unwrap();
        assert_eq!(config.template(), Some("binary"));
    }
}
