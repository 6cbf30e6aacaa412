//! Logging initialization.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::settings::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    if config.format == "json" {
        init_json(filter)
    } else {
        init_text(filter)
    }
}

fn init_json(filter: EnvFilter) -> Result<()> {
    let subscriber = Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_target(false));

    tracing::subscriber::set_global_default(subscriber)?;
    tracing::debug!("JSON logging initialized");
    Ok(())
}

fn init_text(filter: EnvFilter) -> Result<()> {
    let subscriber = Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false));

    tracing::subscriber::set_global_default(subscriber)?;
    tracing::debug!("Console logging initialized");
    Ok(())
}
