//! Logging initialization using the `tracing` ecosystem.
//!
//! Provides:
//! - Console output (colored, human-readable)
//! - Optional file output (daily rotation via `tracing-appender`)
//! - Configurable log level via env var `RUST_LOG` or explicit parameter

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging settings, usually filled from the runner CLI.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Default level if `RUST_LOG` is not set (e.g. `"info"`).
    pub level: String,
    /// Directory for daily-rotating log files. Console only when `None`.
    pub dir: Option<String>,
    /// Log file prefix (e.g. `"sb-runner"`).
    pub file_prefix: String,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".into(),
            dir: None,
            file_prefix: "sb-runner".into(),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Should be called once at program start, before the webhook server is
/// bound. After this, all `tracing::info!()` etc. macros will produce output.
pub fn init_logging(opts: &LogOptions) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&opts.level));

    let console_layer = fmt::layer().with_target(true).with_ansi(true);

    let file_layer = opts.dir.as_deref().map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, &opts.file_prefix);
        fmt::layer().with_writer(appender).with_ansi(false).with_target(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}
