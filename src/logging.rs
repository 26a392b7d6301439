//! Process-wide `tracing` setup.
//!
//! Events go to stdout and to a daily-rotating file under the configured log
//! directory. Library code only emits events; `main` calls [`init_logging`]
//! once and keeps the returned guard alive until exit so the non-blocking
//! file writer gets flushed.

use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used as the log file prefix.
    pub app_name: &'static str,
    pub log_dir: PathBuf,
    /// Number of daily files kept before the oldest is removed.
    pub retention: usize,
    /// Applied when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl LogConfig {
    pub fn new(log_dir: PathBuf) -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME"),
            log_dir,
            retention: crate::config::LOG_RETENTION_FILES,
            default_filter: "info",
        }
    }
}

pub fn init_logging(config: LogConfig) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir).with_context(|| {
        format!(
            "failed to create log directory: {}",
            config.log_dir.display()
        )
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.app_name)
        .filename_suffix("log")
        .max_log_files(config.retention)
        .build(&config.log_dir)
        .context("failed to create rolling log file")?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_file(true)
                .with_line_number(true),
        )
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    Ok(guard)
}
