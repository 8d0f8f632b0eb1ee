//! Console logging initialization

use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{PortalConfig, DEFAULT_LOG_FILTER};

/// Filter from `RUST_LOG`, then the configured filter, then the built-in one.
fn env_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber. Safe to call more than once.
pub fn init(config: &PortalConfig) {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    let installed = tracing_subscriber::registry()
        .with(env_filter(&config.log_filter))
        .with(fmt_layer)
        .try_init();
    if let Err(err) = installed {
        eprintln!("Warning: logging already initialized: {err}");
    }

    for setting in &config.invalid {
        warn!(
            key = setting.key,
            value = %setting.value,
            "invalid configuration value, using default"
        );
    }
}
