//! Assay: the process-wide analysis context for tabular datasets.
//!
//! Assay owns the startup half of an analysis run: it configures logging,
//! loads a configuration and the dataset it names, and publishes the result
//! as the single active [`AnalysisContext`] for the process. The context can
//! be torn down and rebuilt between independent runs.
//!
//! # Core Principles
//!
//! - **One context**: at most one context is active at a time; the first
//!   construction's paths win until it is destroyed
//! - **No partial state**: a failed load leaves nothing published
//! - **Idempotent logging**: reconfiguring replaces the handler's level and
//!   sink, it never stacks handlers
//!
//! # Example
//!
//! ```no_run
//! use assay::{run_startup, AnalysisContext, Severity};
//!
//! let context = run_startup("analysis/config.json", Severity::Info).unwrap();
//! println!("Template: {}", context.template());
//! println!("Rows: {}", context.dataset().row_count());
//!
//! // Between independent runs
//! AnalysisContext::destroy();
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod input;
pub mod logging;

mod startup;

pub use crate::startup::{run_startup, Startup};
pub use config::{AnalysisConfig, ConfigProvider, DataConfig, JsonConfigProvider};
pub use context::{AnalysisContext, ContextHolder, ContextSummary, Loader, DEFAULT_TEMPLATE};
pub use error::{AssayError, Result};
pub use input::{CsvDatasetLoader, DataTable, DatasetLoader, SourceMetadata};
pub use logging::{LogSink, Severity, SharedBuffer, LOGGER_NAME};

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
