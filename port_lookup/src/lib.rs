//! Port Lookup - Core Library
//!
//! Loads a dataset of port records into a concurrent in-memory store and
//! serves exact-key lookups over HTTP.

pub mod cli;
pub mod loader;
pub mod middleware;
pub mod port;
pub mod server;
pub mod settings;
pub mod store;
pub mod telemetry;

pub use loader::{LoadError, LoadState, Loader};
pub use port::Port;
pub use store::PortStore;
