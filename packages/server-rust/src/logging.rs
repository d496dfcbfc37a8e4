//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ENV_PRODUCTION};

/// Installs the global subscriber: JSON output in production, compact
/// human-readable output everywhere else. `RUST_LOG` overrides the default
/// `info` filter.
pub fn init(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if config.app_env == ENV_PRODUCTION {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
