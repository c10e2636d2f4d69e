//! Logging setup for tenantpulse
//!
//! Every run appends to a daily rolling file under the XDG state directory
//! (`~/.local/state/tenantpulse/tenantpulse.log.YYYY-MM-DD`). Stdout is
//! reserved for report output, so nothing is logged there; with
//! `[logging] stderr = true` warnings and errors are echoed to stderr too.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Prefix of the rolling log files inside [`Config::state_dir`].
pub const LOG_FILE_PREFIX: &str = "tenantpulse.log";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `[logging] level` when set. Keep the returned guard
/// alive for the whole run; dropping it flushes buffered lines.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .max_log_files(config.max_files.max(1))
        .build(&log_dir)
        .map_err(|e| Error::Config(format!("failed to create log file: {e}")))?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter(&config.level)?);

    let stderr_layer = config.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {e}")))?;

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        stderr = config.stderr,
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Filter from `RUST_LOG`, else from the configured level.
///
/// An unparseable configured level is a configuration error rather than a
/// silent fallback.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| Error::Config(format!("invalid logging.level {level:?}: {e}")))
}

/// Route logs to the test harness. Safe to call from every test.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

/// Flushes pending log lines when dropped.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_accepts_levels_and_directives() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(env_filter("info").is_ok());
        assert!(env_filter("tenantpulse_core=debug,warn").is_ok());
    }

    #[test]
    fn test_env_filter_rejects_garbage() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(matches!(env_filter("tenantpulse=loud"), Err(Error::Config(_))));
    }

    #[test]
    fn test_log_prefix_lives_in_state_dir() {
        let path = Config::state_dir().join(LOG_FILE_PREFIX);
        assert!(path.ends_with("tenantpulse/tenantpulse.log"));
    }
}
