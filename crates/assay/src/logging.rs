//! Process-wide logger for Assay.
//!
//! The logger is a single `tracing` handler, installed into the global
//! subscriber the first time [`configure`] runs. Later calls never attach a
//! second handler: they swap the handler's sink and severity in place, so
//! reconfiguring between independent runs is a pure function of
//! `(LOGGER_NAME, level, sink)`.
//!
//! Every line starts with a bracketed local timestamp, then the level name,
//! the event target and the message:
//!
//! ```text
//! [2024-06-01 09:14:03.512] DEBUG assay::startup: Logging configured level=DEBUG
//! ```
//!
//! Only events from the `assay` and `assay_cli` crates are handled.
//! Severities follow the conventional ordinal scale (see [`Severity`]);
//! `tracing` has no level above ERROR, so CRITICAL events are ERROR events
//! carrying a `critical` field and are emitted with the
//! [`critical!`](crate::critical) macro.

use std::fmt::{self, Write as _};
use std::io;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::Local;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::dynamic_filter_fn;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::AssayError;

/// Name of the logger; also the root of the handled target namespace.
pub const LOGGER_NAME: &str = "assay";

/// Crate roots whose events the logger handles.
const OWNED_ROOTS: [&str; 2] = [LOGGER_NAME, "assay_cli"];

/// Field marking an ERROR event as CRITICAL.
pub const CRITICAL_FIELD: &str = "critical";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Level ordinal meaning "never configured".
const UNSET: u8 = 0;

/// Ordinal given to TRACE events, below every configurable severity.
const TRACE_ORDINAL: u8 = 5;

/// Logging severity on the conventional 10..50 ordinal scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Debug = 10,
    Info = 20,
    #[default]
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Severity {
    /// Every severity, least to most severe.
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Numeric ordinal (10, 20, 30, 40 or 50).
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Look up a severity by its exact ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.ordinal() == ordinal)
    }

    /// Upper-case level name as printed in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for Severity {
    type Error = AssayError;

    /// Accepts exactly 10, 20, 30, 40 and 50; anything else is rejected.
    fn try_from(ordinal: u8) -> Result<Self, AssayError> {
        Self::from_ordinal(ordinal).ok_or_else(|| AssayError::InvalidLogLevel(ordinal.to_string()))
    }
}

impl FromStr for Severity {
    type Err = AssayError;

    /// Accepts level names (case-insensitive, `warn` as an alias) or ordinals.
    fn from_str(s: &str) -> Result<Self, AssayError> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            other => other
                .parse::<u8>()
                .ok()
                .and_then(Severity::from_ordinal)
                .ok_or_else(|| AssayError::InvalidLogLevel(trimmed.to_string())),
        }
    }
}

/// In-memory log destination, shareable across threads.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Where the logger writes.
#[derive(Debug, Clone, Default)]
pub enum LogSink {
    /// The process error stream.
    #[default]
    Stderr,
    /// An in-memory buffer.
    Buffer(SharedBuffer),
}

/// Writer handed to the handler for one formatted line.
pub(crate) enum SinkHandle {
    Stderr(io::Stderr),
    Buffer(SharedBuffer),
}

impl io::Write for SinkHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkHandle::Stderr(stderr) => stderr.write(buf),
            SinkHandle::Buffer(buffer) => {
                buffer.0.lock().extend_from_slice(buf);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkHandle::Stderr(stderr) => stderr.flush(),
            SinkHandle::Buffer(_) => Ok(()),
        }
    }
}

struct LoggerState {
    level: AtomicU8,
    sink: Mutex<LogSink>,
}

static STATE: Lazy<LoggerState> = Lazy::new(|| LoggerState {
    level: AtomicU8::new(UNSET),
    sink: Mutex::new(LogSink::Stderr),
});

/// Whether our handler owns the global subscriber. Set once.
static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Routes each line to whatever sink is current.
struct CurrentSink;

impl<'a> MakeWriter<'a> for CurrentSink {
    type Writer = SinkHandle;

    fn make_writer(&'a self) -> Self::Writer {
        match &*STATE.sink.lock() {
            LogSink::Stderr => SinkHandle::Stderr(io::stderr()),
            LogSink::Buffer(buffer) => SinkHandle::Buffer(buffer.clone()),
        }
    }
}

/// Configure the process-wide logger.
///
/// Safe to call any number of times: the first call installs the handler,
/// every call replaces its sink and sets the effective level to `level`.
///
/// If another global subscriber was installed before the first call, the
/// level and sink are still recorded but lines go through that subscriber;
/// this is reported once as a warning.
pub fn configure(level: Severity, sink: LogSink) {
    *STATE.sink.lock() = sink;
    STATE.level.store(level.ordinal(), Ordering::SeqCst);

    INSTALLED.get_or_init(install);
}

/// The level set by the most recent [`configure`], if any.
pub fn effective_level() -> Option<Severity> {
    Severity::from_ordinal(STATE.level.load(Ordering::SeqCst))
}

/// Whether an event at `severity` would currently be written.
pub fn is_enabled(severity: Severity) -> bool {
    let level = STATE.level.load(Ordering::SeqCst);
    level != UNSET && severity.ordinal() >= level
}

fn install() -> bool {
    let handler = tracing_subscriber::fmt::layer()
        .event_format(BracketedFormat)
        .with_writer(CurrentSink)
        // The level moves at runtime, so callsite interest must never be cached
        .with_filter(dynamic_filter_fn(|meta, _cx| accepts(meta)));

    match tracing_subscriber::registry().with(handler).try_init() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "A global subscriber is already installed; assay log lines go to it"
            );
            false
        }
    }
}

/// Whether `target` belongs to the logger's namespace.
pub(crate) fn in_namespace(target: &str) -> bool {
    OWNED_ROOTS.iter().any(|root| match target.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    })
}

fn accepts(meta: &Metadata<'_>) -> bool {
    if !meta.is_event() || !in_namespace(meta.target()) {
        return false;
    }
    let level = STATE.level.load(Ordering::Relaxed);
    level != UNSET && event_ordinal(meta) >= level
}

fn event_ordinal(meta: &Metadata<'_>) -> u8 {
    match *meta.level() {
        Level::TRACE => TRACE_ORDINAL,
        Level::DEBUG => Severity::Debug.ordinal(),
        Level::INFO => Severity::Info.ordinal(),
        Level::WARN => Severity::Warning.ordinal(),
        _ if meta.fields().field(CRITICAL_FIELD).is_some() => Severity::Critical.ordinal(),
        _ => Severity::Error.ordinal(),
    }
}

fn level_label(meta: &Metadata<'_>) -> &'static str {
    Severity::from_ordinal(event_ordinal(meta))
        .map(Severity::as_str)
        .unwrap_or("TRACE")
}

/// `[date time] LEVEL target: message key=value ...`
pub(crate) struct BracketedFormat;

impl<S, N> FormatEvent<S, N> for BracketedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let mut line = LineVisitor::default();
        event.record(&mut line);

        write!(
            writer,
            "[{}] {} {}: {}",
            Local::now().format(TIMESTAMP_FORMAT),
            level_label(meta),
            meta.target(),
            line.message
        )?;
        for (name, value) in &line.fields {
            write!(writer, " {}={}", name, value)?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl LineVisitor {
    fn push(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = value,
            CRITICAL_FIELD => {}
            name => self.fields.push((name, value)),
        }
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{:?}", value));
    }
}

/// Log at CRITICAL severity.
///
/// Expands to an ERROR event with `critical = true`, which the handler
/// ranks above ERROR and labels `CRITICAL`.
#[macro_export]
macro_rules! critical {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__private::tracing::error!(target: $target, critical = true, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__private::tracing::error!(critical = true, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(emit: impl FnOnce()) -> String {
        let buffer = SharedBuffer::new();
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .event_format(BracketedFormat)
            .with_writer(move || SinkHandle::Buffer(sink.clone()))
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        buffer.contents()
    }

    #[test]
    fn test_severity_ordinals() {
        let ordinals: Vec<u8> = Severity::ALL.iter().map(|s| s.ordinal()).collect();
        assert_eq!(ordinals, vec![10, 20, 30, 40, 50]);
        assert!(Severity::Debug < Severity::Critical);
    }

    #[test]
    fn test_try_from_rejects_unknown_ordinals() {
        assert_eq!(Severity::try_from(40).unwrap(), Severity::Error);
        assert!(matches!(
            Severity::try_from(25),
            Err(AssayError::InvalidLogLevel(ref v)) if v == "25"
        ));
        assert!(Severity::try_from(0).is_err());
    }

    #[test]
    fn test_from_str_names_and_ordinals() {
        assert_eq!("DEBUG".parse::<Severity>().unwrap(), Severity::Debug);
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!(" Critical ".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!("30".parse::<Severity>().unwrap(), Severity::Warning);
        assert!("verbose".parse::<Severity>().is_err());
        assert!("35".parse::<Severity>().is_err());
    }

    #[test]
    fn test_namespace() {
        assert!(in_namespace("assay"));
        assert!(in_namespace("assay::context"));
        assert!(in_namespace("assay_cli"));
        assert!(in_namespace("assay_cli::commands"));
        assert!(!in_namespace("assayer"));
        assert!(!in_namespace("assay_foo"));
        assert!(!in_namespace("assay_cli_extras"));
        assert!(!in_namespace("hyper::client"));
    }

    #[test]
    fn test_line_starts_with_bracketed_local_date() {
        let output = capture(|| {
            tracing::info!(target: "assay::test", rows = 3, "Loaded dataset");
        });

        let expected = format!("[{}", Local::now().format("%Y-%m-%d"));
        assert!(output.starts_with(&expected), "got: {output}");
        assert!(output.contains("] INFO assay::test: Loaded dataset rows=3\n"));
    }

    #[test]
    fn test_critical_label_hides_marker_field() {
        let output = capture(|| {
            crate::critical!(code = 7, "Dataset vanished");
        });

        assert!(output.contains("] CRITICAL "), "got: {output}");
        assert!(output.contains("Dataset vanished code=7"));
        assert!(!output.contains("critical=true"));
    }

    #[test]
    fn test_shared_buffer_clear() {
        let buffer = SharedBuffer::new();
        io::Write::write_all(&mut SinkHandle::Buffer(buffer.clone()), b"line\n").unwrap();
        assert_eq!(buffer.contents(), "line\n");

        buffer.clear();
        assert!(buffer.is_empty());
    }
}
