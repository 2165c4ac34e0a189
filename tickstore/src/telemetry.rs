//! Subscriber construction from the logger settings.
//!
//! Nothing here installs a global subscriber: the returned [`Dispatch`] is
//! handed to the service, which logs through it explicitly.

use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use tickstore_core::LoggerConfig;

/// Map a configured level name to a filter. Unknown names select debug.
#[must_use]
pub fn level_filter(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "error" => LevelFilter::ERROR,
        "info" => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Build a formatting subscriber for `cfg`.
///
/// `RUST_LOG` directives, when set, refine the configured level. Dev mode
/// enables coloured output.
#[must_use]
pub fn dispatch_from_config(cfg: &LoggerConfig) -> Dispatch {
    let filter = EnvFilter::builder()
        .with_default_directive(level_filter(&cfg.level).into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(cfg.is_dev_mode)
        .with_target(false)
        .finish();
    Dispatch::new(subscriber)
}
