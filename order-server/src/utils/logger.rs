//! Logging infrastructure
//!
//! Structured logging setup with optional daily-rolling file output.

use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// `RUST_LOG` overrides `log_level` when set. When `log_dir` points at an
/// existing directory, output goes to a daily-rolling file there instead
/// of stderr.
pub fn init_logger(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let path = std::path::Path::new(dir);
        if path.exists() {
            let file_appender = tracing_appender::rolling::daily(dir, "order-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}
