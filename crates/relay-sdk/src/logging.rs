//! Logging bootstrap.
//!
//! Installs a `tracing-subscriber` fmt subscriber filtered by the
//! component configuration: `quiet` turns output off, `debug` enables the
//! debug level, anything else logs at info. `RUST_LOG` refines the filter
//! unless the component is quiet.

use tracing_subscriber::EnvFilter;

use crate::config::ComponentConfig;

/// Filter directive for a configuration.
pub fn directive(config: &ComponentConfig) -> &'static str {
    if config.quiet {
        "off"
    } else if config.debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed; the existing
/// one is kept.
pub fn init(config: &ComponentConfig) -> bool {
    let level = directive(config);
    let filter = if config.quiet {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            service = %config.name,
            version = %config.version,
            mapping = %config.mapping,
            "logging initialised"
        );
    }
    installed
}
