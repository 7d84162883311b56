//! Tracing subscriber setup

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{DEFAULT_LOG_FILTER, LogFormat, RelayConfig};

/// Installs the global subscriber described by `config`
///
/// The returned guard flushes buffered file output on drop and must be held
/// until the process exits.
pub fn init_logging(config: &RelayConfig) -> io::Result<Option<WorkerGuard>> {
    match &config.log_file {
        Some(path) => {
            let appender = file_appender(path)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            install(config.log_format, writer, false);
            Ok(Some(guard))
        }
        None => {
            install(config.log_format, io::stderr, true);
            Ok(None)
        }
    }
}

fn install<W>(format: LogFormat, writer: W, with_ansi: bool)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = build_env_filter();

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(writer))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(with_ansi))
                .init();
        }
    }
}

/// File appender that never rotates, creating parent directories as needed
fn file_appender(path: &Path) -> io::Result<tracing_appender::rolling::RollingFileAppender> {
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log file path {:?} has no file name", path),
        )
    })?;

    std::fs::create_dir_all(directory)?;

    Ok(tracing_appender::rolling::never(directory, file_name))
}

/// `RUST_LOG` wins over the built-in default
fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
