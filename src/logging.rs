use crate::config::LoggingConfig;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "basic_cleaning.log";

/// Builds the subscriber: console output plus, when enabled, a daily-rotated
/// JSON log file under `config.dir`.
pub fn build_subscriber(
    config: &LoggingConfig,
) -> (impl tracing::Subscriber + Send + Sync + 'static, Option<WorkerGuard>) {
    // Respect RUST_LOG if set; otherwise info for our crate and everything else
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("basic_cleaning=info,info"));

    let (file_layer, guard) = if config.file_logging && fs::create_dir_all(&config.dir).is_ok() {
        let file_appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
        (Some(fmt::layer().json().with_writer(non_blocking_writer)), Some(guard))
    } else {
        (None, None)
    };

    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stdout);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer);
    (subscriber, guard)
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so the caller
/// holds it until the process exits.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let (subscriber, guard) = build_subscriber(config);
    if let Err(e) = subscriber.try_init() {
        eprintln!("Logging already initialized: {}", e);
    }
    guard
}
