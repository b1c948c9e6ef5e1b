//! Structured logging.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    }
}

fn default_directives(level: &str) -> String {
    format!("social_gateway={level},tower_http={level}")
}
