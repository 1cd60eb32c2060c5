use crate::conf::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "http-sniffer.log";

/// Initialize the logging system with JSON formatting and environment-based filtering
///
/// - `RUST_LOG` wins; otherwise `config.level` is used
/// - Events are written as flattened JSON objects
/// - Output goes to stderr, keeping stdout for the dashboard, or to a daily
///   rolling file under `config.log_dir`
///
/// The returned guard flushes the file writer on drop and must be held for
/// as long as the process logs.
pub fn init_normal_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            fmt()
                .with_env_filter(filter)
                .json()
                .flatten_event(true)
                .with_writer(writer)
                .init();

            Some(guard)
        }
        None => {
            fmt()
                .with_env_filter(filter)
                .json()
                .flatten_event(true)
                .with_writer(std::io::stderr)
                .init();

            None
        }
    }
}

pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    // If tokio-console is enabled, DO NOT install the normal subscriber
    if std::env::var("TOKIO_CONSOLE").is_ok() {
        console_subscriber::init();
        None
    } else {
        init_normal_logging(config)
    }
}
