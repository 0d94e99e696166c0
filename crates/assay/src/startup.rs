//! Startup: wire logging, then materialize the analysis context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::context::{AnalysisContext, ContextHolder, Loader};
use crate::error::Result;
use crate::logging::{self, LogSink, Severity};

/// Configure logging at `log_level` on stderr and fetch or create the
/// process-wide context from `config_path`.
///
/// Calling this again in the same process re-applies the level without
/// stacking handlers and returns the context already active, if any.
pub fn run_startup(config_path: impl AsRef<Path>, log_level: Severity) -> Result<Arc<AnalysisContext>> {
    Startup::new(config_path.as_ref()).log_level(log_level).run()
}

/// Builder for a startup run with non-default sink, loader or holder.
///
/// ```no_run
/// use assay::{LogSink, Severity, SharedBuffer, Startup};
///
/// let buffer = SharedBuffer::new();
/// let context = Startup::new("analysis/config.json")
///     .output_path("analysis/reports")
///     .log_level(Severity::Debug)
///     .sink(LogSink::Buffer(buffer.clone()))
///     .run()
///     .unwrap();
///
/// println!("{} rows", context.dataset().row_count());
/// ```
#[derive(Debug)]
pub struct Startup<'h> {
    config_path: PathBuf,
    output_path: Option<PathBuf>,
    log_level: Severity,
    sink: LogSink,
    loader: Loader,
    holder: &'h ContextHolder,
}

impl Startup<'static> {
    /// Start from defaults: WARNING on stderr, JSON config, CSV data,
    /// process-wide holder.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            output_path: None,
            log_level: Severity::default(),
            sink: LogSink::default(),
            loader: Loader::default(),
            holder: ContextHolder::global(),
        }
    }
}

impl<'h> Startup<'h> {
    /// Output directory for a newly created context.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn log_level(mut self, level: Severity) -> Self {
        self.log_level = level;
        self
    }

    pub fn sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    /// Publish into `holder` instead of the process-wide holder.
    pub fn holder<'a>(self, holder: &'a ContextHolder) -> Startup<'a> {
        Startup {
            config_path: self.config_path,
            output_path: self.output_path,
            log_level: self.log_level,
            sink: self.sink,
            loader: self.loader,
            holder,
        }
    }

    pub fn run(self) -> Result<Arc<AnalysisContext>> {
        logging::configure(self.log_level, self.sink);
        debug!(level = %self.log_level, "Logging configured");

        let context = self
            .holder
            .get_or_create(
                &self.loader,
                Some(self.config_path.as_path()),
                self.output_path.as_deref(),
            )
            .inspect_err(|e| error!(config = %self.config_path.display(), "Startup failed: {e}"))?;

        info!(
            config = %context.config_path().display(),
            template = context.template(),
            "Startup complete"
        );
        Ok(context)
    }
}
