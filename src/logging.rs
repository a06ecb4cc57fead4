use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter when `RUST_LOG` is unset.
///
/// sqlx logs every statement at info, so it stays at warn. `tower_http`
/// carries the per-request spans and follows the configured level.
pub fn filter_directives(level: &str) -> String {
    format!("{level},sqlx=warn,tower_http={level}")
}

/// Install the global subscriber for the account service.
///
/// Writes to `{log_dir}/{log_file}` with the configured rotation, plus stdout
/// in text mode. Keep the returned guard alive for the life of the process:
/// dropping it flushes and stops the background writer.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    };
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    // JSON goes to the file only; text mode mirrors to the terminal
    if config.use_json {
        registry
            .with(fmt::layer().json().with_writer(writer).with_ansi(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(writer).with_ansi(false))
            .with(fmt::layer().with_target(false))
            .init();
    }

    tracing::info!(
        level = %config.log_level,
        log_dir = %config.log_dir,
        "Logging initialized"
    );

    guard
}
