//! The injectable provider pair used to construct a context.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::{AnalysisConfig, ConfigProvider, JsonConfigProvider};
use crate::error::Result;
use crate::input::{CsvDatasetLoader, DataTable, DatasetLoader};

/// A config provider and a dataset loader.
///
/// The default pair reads a JSON config and the CSV/TSV file it names.
/// Tests and embedding hosts substitute their own providers.
///
/// Providers run while the holder is mid-load; a provider that calls back
/// into the same holder sees it empty and cannot start a nested load.
#[derive(Clone)]
pub struct Loader {
    config: Arc<dyn ConfigProvider>,
    dataset: Arc<dyn DatasetLoader>,
}

impl Loader {
    pub fn new(
        config: impl ConfigProvider + 'static,
        dataset: impl DatasetLoader + 'static,
    ) -> Self {
        Self {
            config: Arc::new(config),
            dataset: Arc::new(dataset),
        }
    }

    /// Replace the config provider, keeping the dataset loader.
    pub fn with_config_provider(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.config = Arc::new(provider);
        self
    }

    /// Replace the dataset loader, keeping the config provider.
    pub fn with_dataset_loader(mut self, loader: impl DatasetLoader + 'static) -> Self {
        self.dataset = Arc::new(loader);
        self
    }

    pub fn load_config(&self, path: &Path) -> Result<AnalysisConfig> {
        self.config.load_config(path)
    }

    pub fn load_dataset(&self, config: &AnalysisConfig) -> Result<DataTable> {
        self.dataset.load_dataset(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(JsonConfigProvider, CsvDatasetLoader)
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader").finish_non_exhaustive()
    }
}
