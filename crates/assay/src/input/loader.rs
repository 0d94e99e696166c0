//! The dataset loader seam and its default delimited-text implementation.

use crate::config::AnalysisConfig;
use crate::error::Result;

use super::parser::Parser;
use super::source::DataTable;

/// Produces the dataset described by a config.
pub trait DatasetLoader: Send + Sync {
    fn load_dataset(&self, config: &AnalysisConfig) -> Result<DataTable>;
}

impl<F> DatasetLoader for F
where
    F: Fn(&AnalysisConfig) -> Result<DataTable> + Send + Sync,
{
    fn load_dataset(&self, config: &AnalysisConfig) -> Result<DataTable> {
        self(config)
    }
}

/// Reads the config's data file as CSV/TSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvDatasetLoader;

impl DatasetLoader for CsvDatasetLoader {
    fn load_dataset(&self, config: &AnalysisConfig) -> Result<DataTable> {
        let data = config.data();
        Parser::with_config(data.parser_config()).parse_file(&data.path)
    }
}
