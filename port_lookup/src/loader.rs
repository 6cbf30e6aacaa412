//! One-shot bulk ingest of the port dataset into a [`PortStore`].
//!
//! The source is a JSON object mapping keys (normally UN/LOCODEs) to port
//! objects. The whole document is read and decoded before anything is written,
//! and the decoded entries are committed to the store in a single batch: a
//! failed load leaves the store untouched.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::port::Port;
use crate::store::PortStore;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("port source {origin} is unavailable: {source}")]
    SourceUnavailable {
        origin: String,
        #[source]
        source: io::Error,
    },

    #[error("port data is malformed: {0}")]
    MalformedData(#[from] serde_json::Error),

    #[error("port data load was already attempted ({state:?})")]
    AlreadyAttempted { state: LoadState },
}

impl LoadError {
    fn unavailable(origin: impl Into<String>, source: io::Error) -> Self {
        Self::SourceUnavailable {
            origin: origin.into(),
            source,
        }
    }
}

/// Progress of the one-shot load. `Loaded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded { count: usize },
    Failed,
}

/// Drives a single load into a shared store.
pub struct Loader {
    store: Arc<PortStore>,
    state: LoadState,
}

impl Loader {
    pub fn new(store: Arc<PortStore>) -> Self {
        Self {
            store,
            state: LoadState::NotLoaded,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Loads the dataset from a file on disk.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load_path(&mut self, path: &Path) -> Result<usize, LoadError> {
        let origin = path.display().to_string();
        self.run(|| {
            let file = File::open(path).map_err(|e| LoadError::unavailable(&origin, e))?;
            read_all(&origin, file)
        })
    }

    /// Loads the dataset from any byte stream; `origin` names it in errors and logs.
    #[instrument(skip(self, reader))]
    pub fn load_reader<R: Read>(&mut self, origin: &str, reader: R) -> Result<usize, LoadError> {
        self.run(|| read_all(origin, reader))
    }

    /// Loads the dataset from an in-memory buffer.
    pub fn load_slice(&mut self, bytes: &[u8]) -> Result<usize, LoadError> {
        self.run(|| Ok(bytes.to_vec()))
    }

    fn run<F>(&mut self, read: F) -> Result<usize, LoadError>
    where
        F: FnOnce() -> Result<Vec<u8>, LoadError>,
    {
        if self.state != LoadState::NotLoaded {
            return Err(LoadError::AlreadyAttempted { state: self.state });
        }

        self.state = LoadState::Loading;
        let started = Instant::now();

        let result = read().and_then(|bytes| {
            debug!(bytes = bytes.len(), "decoding port data");
            decode(&bytes)
        });

        match result {
            Ok(ports) => {
                let count = self.store.extend(ports);
                self.state = LoadState::Loaded { count };
                info!(
                    count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Loaded ports into memory"
                );
                Ok(count)
            }
            Err(e) => {
                self.state = LoadState::Failed;
                error!("Failed to load ports: {}", e);
                Err(e)
            }
        }
    }
}

/// Convenience wrapper running a fresh [`Loader`] against `path`.
pub fn load_ports(store: Arc<PortStore>, path: impl AsRef<Path>) -> Result<usize, LoadError> {
    Loader::new(store).load_path(path.as_ref())
}

/// Decodes a document without touching any store.
pub fn decode(bytes: &[u8]) -> Result<HashMap<String, Port>, LoadError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn read_all<R: Read>(origin: &str, mut reader: R) -> Result<Vec<u8>, LoadError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| LoadError::unavailable(origin, e))?;
    Ok(bytes)
}

/// Path of the dataset relative to the working directory when nothing else is configured.
pub fn default_source() -> PathBuf {
    PathBuf::from("ports.json")
}
