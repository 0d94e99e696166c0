//! The active analysis context.
//!
//! An [`AnalysisContext`] bundles the configuration, the loaded dataset and
//! the report template for one analysis run. Contexts are published in a
//! [`ContextHolder`]; the process-wide holder backs the associated
//! functions on `AnalysisContext` (`get_or_create`, `current`, `destroy`)
//! used at entry points. Code further down should take the context as an
//! argument instead of reaching for the global.

mod holder;
mod loader;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{AssayError, Result};
use crate::input::DataTable;

pub use holder::ContextHolder;
pub use loader::Loader;

/// Template used when the config does not name one.
pub const DEFAULT_TEMPLATE: &str = "binary";

static TEMPLATE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*$").unwrap());

/// Configuration, dataset and template for one analysis run.
///
/// Fields are fixed once loading finishes.
#[derive(Debug)]
pub struct AnalysisContext {
    config_path: PathBuf,
    output_path: PathBuf,
    config: AnalysisConfig,
    dataset: DataTable,
    template: String,
    loaded_at: DateTime<Local>,
}

impl AnalysisContext {
    /// Build a context without publishing it.
    ///
    /// Runs the config provider, then the dataset loader, then selects the
    /// template. Provider errors are returned as-is. `output_path` defaults
    /// to the config's output directory.
    pub fn load(loader: &Loader, config_path: &Path, output_path: Option<&Path>) -> Result<Self> {
        let config = loader.load_config(config_path)?;
        let dataset = loader.load_dataset(&config)?;
        let template = select_template(&config)?;

        let output_path = match output_path {
            Some(path) => path.to_path_buf(),
            None => config.output_dir().to_path_buf(),
        };

        Ok(Self {
            config_path: config_path.to_path_buf(),
            output_path,
            config,
            dataset,
            template,
            loaded_at: Local::now(),
        })
    }

    /// Fetch the process-wide context, creating it with the default loader.
    pub fn get_or_create(
        config_path: Option<&Path>,
        output_path: Option<&Path>,
    ) -> Result<Arc<Self>> {
        Self::get_or_create_with(&Loader::default(), config_path, output_path)
    }

    /// Fetch the process-wide context, creating it with `loader`.
    pub fn get_or_create_with(
        loader: &Loader,
        config_path: Option<&Path>,
        output_path: Option<&Path>,
    ) -> Result<Arc<Self>> {
        ContextHolder::global().get_or_create(loader, config_path, output_path)
    }

    /// The process-wide context, if one is active.
    pub fn current() -> Option<Arc<Self>> {
        ContextHolder::global().current()
    }

    /// Tear down the process-wide context. Idempotent.
    pub fn destroy() {
        ContextHolder::global().destroy();
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn dataset(&self) -> &DataTable {
        &self.dataset
    }

    /// Report template identifier.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_output_dir(&self) -> Result<&Path> {
        fs::create_dir_all(&self.output_path).map_err(|e| AssayError::Io {
            path: self.output_path.clone(),
            source: e,
        })?;
        Ok(&self.output_path)
    }

    /// A serializable snapshot for display.
    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            config_path: self.config_path.clone(),
            output_path: self.output_path.clone(),
            template: self.template.clone(),
            row_count: self.dataset.row_count(),
            column_count: self.dataset.column_count(),
            columns: self.dataset.headers().map(str::to_string).collect(),
            data_file: self.dataset.source().map(|s| s.path.clone()),
            data_hash: self.dataset.source().map(|s| s.hash.clone()),
            loaded_at: self.loaded_at,
        }
    }
}

/// Snapshot of a context: paths, template and dataset shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSummary {
    pub config_path: PathBuf,
    pub output_path: PathBuf,
    pub template: String,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_hash: Option<String>,
    pub loaded_at: DateTime<Local>,
}

impl ContextSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The config's template, or [`DEFAULT_TEMPLATE`].
fn select_template(config: &AnalysisConfig) -> Result<String> {
    match config.template() {
        None => Ok(DEFAULT_TEMPLATE.to_string()),
        Some(name) if TEMPLATE_ID.is_match(name) => Ok(name.to_string()),
        Some(name) => Err(AssayError::InvalidTemplate(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn loader_for(config: AnalysisConfig, table: DataTable) -> Loader {
        Loader::new(
            move |_: &Path| -> Result<AnalysisConfig> { Ok(config.clone()) },
            move |_: &AnalysisConfig| -> Result<DataTable> { Ok(table.clone()) },
        )
    }

    fn small_table() -> DataTable {
        DataTable::new(
            vec!["id".to_string(), "score".to_string()],
            vec![
                vec!["A".to_string(), "0.2".to_string()],
                vec!["B".to_string(), "0.8".to_string()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_load_fills_every_field() {
        let config = AnalysisConfig::new("data.csv")
            .with_output_dir("reports")
            .with_template("multiclass");
        let loader = loader_for(config, small_table());

        let context = AnalysisContext::load(&loader, Path::new("cfg.json"), None).unwrap();

        assert_eq!(context.config_path(), Path::new("cfg.json"));
        assert_eq!(context.output_path(), Path::new("reports"));
        assert_eq!(context.template(), "multiclass");
        assert_eq!(context.dataset().row_count(), 2);
        assert_eq!(context.config().data().path, PathBuf::from("data.csv"));
    }

    #[test]
    fn test_explicit_output_overrides_config() {
        let loader = loader_for(AnalysisConfig::new("data.csv"), DataTable::empty());
        let context =
            AnalysisContext::load(&loader, Path::new("cfg.json"), Some(Path::new("elsewhere")))
                .unwrap();
        assert_eq!(context.output_path(), Path::new("elsewhere"));
    }

    #[test]
    fn test_default_template() {
        let loader = loader_for(AnalysisConfig::new("data.csv"), DataTable::empty());
        let context = AnalysisContext::load(&loader, Path::new("cfg.json"), None).unwrap();
        assert_eq!(context.template(), DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_malformed_template_rejected() {
        let config = AnalysisConfig::new("data.csv").with_template("../etc/passwd");
        let loader = loader_for(config, DataTable::empty());

        let err = AnalysisContext::load(&loader, Path::new("cfg.json"), None).unwrap_err();
        assert!(matches!(err, AssayError::InvalidTemplate(_)));
    }

    #[test]
    fn test_dataset_error_propagates_unchanged() {
        let loader = Loader::new(
            |_: &Path| -> Result<AnalysisConfig> { Ok(AnalysisConfig::new("gone.csv")) },
            |config: &AnalysisConfig| -> Result<DataTable> {
                Err(AssayError::DatasetLoad {
                    path: config.data().path.clone(),
                    message: "unreadable".to_string(),
                })
            },
        );

        let err = AnalysisContext::load(&loader, Path::new("cfg.json"), None).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load dataset 'gone.csv': unreadable");
    }

    #[test]
    fn test_ensure_output_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/out");
        let loader = loader_for(AnalysisConfig::new("data.csv"), DataTable::empty());
        let context = AnalysisContext::load(&loader, Path::new("cfg.json"), Some(out.as_path())).unwrap();

        let created = context.ensure_output_dir().unwrap();
        assert!(created.is_dir());
    }

    #[test]
    fn test_summary_reports_shape() {
        let loader = loader_for(AnalysisConfig::new("data.csv"), small_table());
        let context = AnalysisContext::load(&loader, Path::new("cfg.json"), None).unwrap();

        let summary = context.summary();
        assert_eq!(summary.columns, vec!["id", "score"]);
        assert_eq!(summary.row_count, 2);
        assert!(summary.data_file.is_none());

        let json = summary.to_json().unwrap();
        assert!(json.contains("\"template\": \"binary\""));
        assert!(!json.contains("data_hash"));
    }
}
