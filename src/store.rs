//! Node storage.
//!
//! The trie persists nodes through a narrow key→bytes interface keyed by
//! node hash. Content addressing makes writes idempotent; nothing is ever
//! deleted, so a store only grows and old roots stay resolvable.

use crate::errors::Error;
use crate::hash::Hash;

use std::collections::HashMap;

/// Backing store for trie nodes, keyed by node hash.
pub trait Database {
    /// Fetch the bytes stored under `key`, or [`Error::KeyNotFound`].
    fn get(&self, key: &Hash) -> Result<Vec<u8>, Error>;

    /// Store `value` under `key`. Overwriting an existing entry is
    /// permitted.
    fn put(&mut self, key: &Hash, value: Vec<u8>) -> Result<(), Error>;
}

/// In-memory reference store: a plain hash map with no eviction.
#[derive(Debug, Default, Clone)]
pub struct MemoryDb {
    entries: HashMap<Hash, Vec<u8>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Database for MemoryDb {
    fn get(&self, key: &Hash) -> Result<Vec<u8>, Error> {
        self.entries.get(key).cloned().ok_or(Error::KeyNotFound)
    }

    fn put(&mut self, key: &Hash, value: Vec<u8>) -> Result<(), Error> {
        self.entries.insert(*key, value);
        Ok(())
    }
}
