//! Logging setup.
//!
//! Console output plus a persistent log file:
//! - size-based rotation with a bounded number of kept backups
//! - local timezone timestamps
//! - filter from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`]

use std::path::{Path, PathBuf};

use chrono::Local;
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::LogConfig;
use crate::utils::fs;

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "homework_bot=info,reqwest=warn,hyper=warn";

/// Active log file name. Backups get `.1`, `.2`, ... appended, `.1` newest.
pub const LOG_FILE_NAME: &str = "homework-bot.log";

/// Custom timer that uses the local timezone via chrono.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Path of the file the appender is writing to.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// Create the log directory and an appender that rotates once the active file
/// reaches `config.max_bytes`, keeping at most `config.max_files` backups.
pub fn build_file_appender(config: &LogConfig) -> crate::Result<BasicRollingFileAppender> {
    fs::ensure_dir_all_sync_with_op("creating log directory", &config.dir)?;

    let path = log_file_path(&config.dir);
    BasicRollingFileAppender::new(
        &path,
        RollingConditionBasic::new().max_size(config.max_bytes.max(1)),
        config.max_files.max(1),
    )
    .map_err(|e| fs::io_error("opening log file", &path, e))
}

/// Initialize logging.
///
/// # Returns
/// The file writer's guard - keep it alive for the app lifetime
pub fn init_logging(config: &LogConfig) -> crate::Result<WorkerGuard> {
    let file_appender = build_file_appender(config)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(true).with_timer(LocalTimer)) // Console output with local time
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_timer(LocalTimer),
        ) // File output with local time
        .try_init()
        .map_err(|e| {
            crate::Error::Other(format!("Failed to set global default subscriber: {}", e))
        })?;

    Ok(guard)
}
