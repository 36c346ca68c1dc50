use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use watchit_core::config::LoggingConfig;

use crate::RuntimeError;

const LOG_PREFIX: &str = "watchit.log";

/// Install the global subscriber: stderr always, plus a daily-rolling file in
/// `log_dir` when enabled. `RUST_LOG` overrides the configured level.
///
/// Keep the returned guard alive; dropping it flushes and stops the file writer.
pub fn init(config: &LoggingConfig, log_dir: &Path) -> Result<Option<WorkerGuard>, RuntimeError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(&config.level)))
        .map_err(|e| RuntimeError::Config(format!("logging.level: {e}")))?;

    let stderr = fmt::layer().with_writer(std::io::stderr);
    let registry = Registry::default().with(filter).with(stderr);

    if config.file {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| RuntimeError::Config(format!("log directory: {e}")))?;
        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .try_init()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        Ok(Some(guard))
    } else {
        registry
            .try_init()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        Ok(None)
    }
}

/// `info` becomes `watchit=info,warn`: our crates at the configured level,
/// dependencies at `warn`.
fn default_directive(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("watchit={level},warn")
    }
}
