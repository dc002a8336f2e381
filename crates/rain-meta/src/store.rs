//! Hash-addressed metadata lookup.
//!
//! The store is a capability handed to compile/decompile calls rather than a
//! hidden global, so tests can substitute an in-memory fake. Fetching from a
//! network is the feeding collaborator's job; `update` here only re-reads the
//! cache. Writes are idempotent, which is what makes racing fetches of the
//! same hash harmless.

use std::collections::HashMap;

use crate::error::MetaError;

/// Check that a string is a well-formed 32-byte meta hash: `0x` + 64 hex
/// digits.
pub fn is_meta_hash(hash: &str) -> bool {
    let Some(digits) = hash.strip_prefix("0x") else {
        return false;
    };
    digits.len() == 64 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Lookup of opmeta bytes by content hash.
pub trait MetaStore {
    /// Read cached bytes for a hash.
    fn get(&self, hash: &str) -> Option<Vec<u8>>;

    /// Cache bytes under a hash. A second write of the same hash overwrites
    /// with equal content.
    fn put(&mut self, hash: &str, bytes: Vec<u8>);

    /// Resolve a hash, refreshing from the backing source when absent.
    fn update(&mut self, hash: &str) -> Result<Vec<u8>, MetaError>;
}

/// In-process `MetaStore` backed by a map. Hashes are normalized to
/// lowercase so mixed-case callers hit the same entry.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from (hash, bytes) pairs.
    pub fn with_entries(entries: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        let mut store = Self::new();
        for (hash, bytes) in entries {
            store.put(&hash, bytes);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetaStore for MemoryStore {
    fn get(&self, hash: &str) -> Option<Vec<u8>> {
        let found = self.entries.get(&hash.to_ascii_lowercase()).cloned();
        log::debug!(
            "meta store get {hash}: {}",
            if found.is_some() { "hit" } else { "miss" }
        );
        found
    }

    fn put(&mut self, hash: &str, bytes: Vec<u8>) {
        self.entries.insert(hash.to_ascii_lowercase(), bytes);
    }

    fn update(&mut self, hash: &str) -> Result<Vec<u8>, MetaError> {
        // No backing source to fetch from; an uncached hash is unresolvable.
        self.get(hash).ok_or_else(|| {
            log::debug!("meta store update {hash}: unresolvable");
            MetaError::UnresolvedHash(hash.to_string())
        })
    }
}
