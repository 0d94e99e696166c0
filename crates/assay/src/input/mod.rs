//! Dataset loading: delimited-text parsing and the loader seam.

mod loader;
mod parser;
mod source;

pub use loader::{CsvDatasetLoader, DatasetLoader};
pub use parser::{Parser, ParserConfig};
pub use source::{DataTable, SourceMetadata};
