//! Concurrent in-memory port store.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::port::Port;

/// Key → port map guarded by a reader-writer lock.
///
/// Records are stored behind `Arc` so readers get a shared handle and the lock
/// is held only for the map access itself. A replaced record is swapped in
/// whole; readers see either the old or the new value, never a mix.
#[derive(Debug, Default)]
pub struct PortStore {
    ports: RwLock<HashMap<String, Arc<Port>>>,
}

impl PortStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `port` under `key`, replacing any previous record.
    pub fn upsert(&self, key: impl Into<String>, port: Port) {
        let port = Arc::new(port);
        self.ports.write().insert(key.into(), port);
    }

    /// Inserts every entry under one write lock, so concurrent readers observe
    /// either none or all of the batch.
    pub fn extend<I>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, Port)>,
    {
        let staged: Vec<(String, Arc<Port>)> = entries
            .into_iter()
            .map(|(key, port)| (key, Arc::new(port)))
            .collect();
        let count = staged.len();

        self.ports.write().extend(staged);
        count
    }

    pub fn get(&self, key: &str) -> Option<Arc<Port>> {
        self.ports.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.ports.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.ports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.read().is_empty()
    }
}
