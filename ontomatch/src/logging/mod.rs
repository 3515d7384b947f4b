//! Structured logging for ontomatch.
//!
//! Installs a global `tracing` subscriber built from a [`LoggingConfig`]: an
//! `EnvFilter` (a `RUST_LOG` value takes precedence over the configured level)
//! and one formatting layer writing to the console, a file, or both. Console
//! output goes to stderr so it never mixes with a program's own output.


use crate::config::{LogFormat, LoggingConfig};
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Error type for logging operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Keeps the background file writer alive.
///
/// Dropping the guard flushes buffered log lines; hold it for as long as the
/// process should keep logging to a file.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the logging system with the given configuration.
///
/// Calling this again after a subscriber is installed is harmless: the first
/// subscriber stays in place.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));
    let (writer, guard) = make_writer(config)?;
    let layer = format_layer(config.format, writer, config.file.is_none());

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
    {
        tracing::debug!(error = %e, "Logging already initialized");
    }

    Ok(LoggingGuard { _file: guard })
}

fn make_writer(config: &LoggingConfig) -> Result<(BoxMakeWriter, Option<WorkerGuard>)> {
    match (&config.file, config.console) {
        (Some(path), true) => {
            let (file, guard) = create_non_blocking_file(path)?;
            Ok((BoxMakeWriter::new(std::io::stderr.and(file)), Some(guard)))
        }
        (Some(path), false) => {
            let (file, guard) = create_non_blocking_file(path)?;
            Ok((BoxMakeWriter::new(file), Some(guard)))
        }
        (None, true) => Ok((BoxMakeWriter::new(std::io::stderr), None)),
        (None, false) => Ok((BoxMakeWriter::new(std::io::sink), None)),
    }
}

fn format_layer<S>(
    format: LogFormat,
    writer: BoxMakeWriter,
    ansi: bool,
) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_line_number(true)
        .with_thread_ids(true);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Default => layer.boxed(),
    }
}

/// Create a non-blocking file writer, creating parent directories as needed.
fn create_non_blocking_file(
    path: impl AsRef<Path>,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        path.parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(".")),
        path.file_name().unwrap_or_default(),
    );

    Ok(tracing_appender::non_blocking(file_appender))
}
