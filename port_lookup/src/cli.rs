//! Command-line interface definitions using clap derive API.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Port lookup service
#[derive(Parser)]
#[command(name = "port-lookup")]
#[command(about = "Serves port records from an in-memory dataset")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the dataset and start the HTTP server
    Serve {
        /// Address to bind to, overriding the configured host and port
        #[arg(long)]
        addr: Option<SocketAddr>,
        /// Dataset file, overriding the configured path
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Load the dataset, report the record count and exit
    Check {
        /// Dataset file, overriding the configured path
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}
