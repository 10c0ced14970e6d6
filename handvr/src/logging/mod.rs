pub mod config;
pub mod macros;

pub use config::{LogConfig, LogScope, init_logging, init_logging_or};
pub use tracing::{Level, debug, error, info, trace, warn};

use once_cell::sync::Lazy;
use std::sync::OnceLock;

static LOG_CONFIG: OnceLock<LogConfig> = OnceLock::new();
static DEFAULT_CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::default);

/// Scope filter installed by [`init_logging`], or the WARN-everywhere default.
pub fn get_log_config() -> &'static LogConfig {
    LOG_CONFIG.get().unwrap_or(&DEFAULT_CONFIG)
}

pub(crate) fn set_log_config(config: LogConfig) {
    // First install wins; later calls keep the existing filter.
    LOG_CONFIG.set(config).ok();
}
