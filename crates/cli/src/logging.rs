//! Tracing subscriber setup for the daemon.

use anyhow::{Context, Result};
use seele_node::{LogFormat, LoggingConfig};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Prefix of the daily files written into a log directory.
const LOG_FILE_PREFIX: &str = "seele-node.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the non-blocking file writer flushing until dropped.
pub struct LoggingHandles {
    _guard: Option<WorkerGuard>,
}

/// Installs the global subscriber. Console output is suppressed in daemon
/// mode; the file sink, when configured, never carries ANSI colors.
pub fn init_tracing(logging: &LoggingConfig, daemon_mode: bool) -> Result<LoggingHandles> {
    let mut layers: Vec<BoxedLayer> = Vec::new();
    if logging.console_output && !daemon_mode {
        layers.push(format_layer(logging.format, io::stderr, true));
    }

    let guard = match logging.file_path.as_deref() {
        Some(path) if !path.as_os_str().is_empty() => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_sink(path)?);
            layers.push(format_layer(logging.format, writer, false));
            Some(guard)
        }
        _ => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter(&logging.level))
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(LoggingHandles { _guard: guard })
}

/// `RUST_LOG` wins over the configured level.
fn env_filter(level: &str) -> EnvFilter {
    let level = match level.trim() {
        "" => "info",
        level => level,
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{level},seele={level}")))
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
    }
}

/// A path with an extension (or an existing file) is appended to as is.
/// Anything else is a directory that gets a new `seele-node.log.YYYY-MM-DD`
/// file each day.
fn open_log_sink(path: &Path) -> Result<Box<dyn Write + Send>> {
    if path.is_file() || path.extension().is_some() {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        return Ok(Box::new(file));
    }

    fs::create_dir_all(path)
        .with_context(|| format!("failed to create log directory {}", path.display()))?;
    Ok(Box::new(rolling::daily(path, LOG_FILE_PREFIX)))
}
