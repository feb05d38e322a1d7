use crate::config::AppConfig;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialise logging for the process. `RUST_LOG` takes precedence over the
/// configured level.
///
/// Safe to call more than once, later calls are no-ops.
pub fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    let _ = if config.use_json {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };
}
