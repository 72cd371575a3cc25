//! Storage
//!
//! Byte-keyed key-value storage the pool persists its records in, a staged
//! transaction overlay, and a typed per-pool view over both.

use std::collections::BTreeMap;

pub mod keys;
pub mod pool_store;

pub use pool_store::*;

/// Durable byte-keyed map with read-your-writes semantics
pub trait Storage {
    /// Get the value stored under a key
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Store a value under a key, replacing any previous value
    fn set(&mut self, key: &[u8], value: Vec<u8>);

    /// Remove a key
    fn delete(&mut self, key: &[u8]);
}

/// In-process storage backed by an ordered map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.entries.insert(key.to_vec(), value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }
}

/// Staged writes over another storage
///
/// Reads see staged writes first. Nothing reaches the inner storage until
/// `commit`; dropping the transaction discards every staged write.
pub struct Transaction<'a> {
    inner: &'a mut dyn Storage,
    /// `None` marks a staged delete
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> Transaction<'a> {
    pub fn begin(inner: &'a mut dyn Storage) -> Self {
        Self {
            inner,
            writes: BTreeMap::new(),
        }
    }

    /// Number of staged writes and deletes
    pub fn pending(&self) -> usize {
        self.writes.len()
    }

    /// Apply every staged write to the inner storage
    pub fn commit(self) {
        for (key, value) in self.writes {
            match value {
                Some(value) => self.inner.set(&key, value),
                None => self.inner.delete(&key),
            }
        }
    }
}

impl Storage for Transaction<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.writes.get(key) {
            Some(staged) => staged.clone(),
            None => self.inner.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.writes.insert(key.to_vec(), Some(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.writes.insert(key.to_vec(), None);
    }
}
