use std::fs::OpenOptions;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::infra::{config::LogConfig, error::AppError};

/// Keeps the background log writer alive; logs are flushed when it drops.
#[derive(Debug)]
pub struct LoggingGuard {
    _writer: WorkerGuard,
}

/// Installs the global subscriber. Stdout is left to the chat console, so
/// records go to stderr or to `config.file` when set.
pub fn init(config: &LogConfig) -> Result<LoggingGuard, AppError> {
    let (writer, guard) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| AppError::LogFileOpen {
                    path: path.clone(),
                    source,
                })?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level)),
        )
        .with_target(true)
        .with_ansi(config.file.is_none())
        .with_writer(writer)
        .try_init()
        .map_err(AppError::LoggingInit)?;

    Ok(LoggingGuard { _writer: guard })
}
