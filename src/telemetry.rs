//! Logging setup
//!
//! Structured logs go to stdout and to a log file through a non-blocking
//! writer. Keep the returned guard alive for the lifetime of the process, or
//! buffered file output is lost on exit.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::ServiceConfig;

pub struct LogGuard {
    _file: WorkerGuard,
}

pub fn init_logging(config: &ServiceConfig) -> anyhow::Result<LogGuard> {
    let appender = tracing_appender::rolling::never(&config.log_dir, &config.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hiring_predictor=info,tower_http=info"));

    Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()?;

    Ok(LogGuard { _file: guard })
}
