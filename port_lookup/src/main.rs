//! Main entry point for the port lookup service.

use anyhow::{Context, Result};
use clap::Parser;
use port_lookup::{cli, loader, server, settings::Settings, telemetry, PortStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let mut settings = Settings::load()?;

    telemetry::init(&settings.logging)?;

    match args.command {
        cli::Commands::Serve { addr, data } => {
            if let Some(addr) = addr {
                settings.set_listen_addr(addr);
            }
            if let Some(data) = data {
                settings.data.path = data;
            }

            let store = load_store(&settings)?;
            server::serve(&settings, store).await
        }
        cli::Commands::Check { data } => {
            if let Some(data) = data {
                settings.data.path = data;
            }

            let store = load_store(&settings)?;
            println!("{}: {} ports", settings.data.path.display(), store.len());
            Ok(())
        }
    }
}

/// Runs the one-shot load; any failure aborts startup before serving.
fn load_store(settings: &Settings) -> Result<Arc<PortStore>> {
    let store = Arc::new(PortStore::new());

    loader::load_ports(store.clone(), &settings.data.path)
        .with_context(|| format!("Error loading ports from {}", settings.data.path.display()))?;

    info!("Successfully loaded ports into memory.");
    Ok(store)
}
