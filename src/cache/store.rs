//! Entry Store Module
//!
//! Byte-sized key/payload storage kept in least-recently-used order.

use lru::LruCache;

// == Entry Store ==
/// Per-cache storage with recency ordering and a running byte total.
///
/// Every successful lookup or insert promotes the key to the
/// most-recently-used position. `bytes` always equals the sum of the
/// payload lengths currently held.
#[derive(Debug)]
pub struct EntryStore {
    /// Key-value storage, least recently used at the tail
    entries: LruCache<String, Vec<u8>>,
    /// Sum of payload lengths
    bytes: u64,
}

impl EntryStore {
    // == Constructor ==
    /// Creates an empty store. Size is bounded by the eviction policy, not here.
    pub fn new() -> Self {
        Self {
            entries: LruCache::unbounded(),
            bytes: 0,
        }
    }

    // == Get ==
    /// Returns the payload for `key` and promotes it to most recently used.
    pub fn get(&mut self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    // == Insert ==
    /// Inserts or replaces `key`, promoting it to most recently used.
    ///
    /// Returns the length of the replaced payload, if any, so the caller can
    /// release it from the global counter.
    pub fn insert(&mut self, key: String, payload: Vec<u8>) -> Option<u64> {
        let added = payload.len() as u64;
        let replaced = self.entries.put(key, payload).map(|old| old.len() as u64);

        if let Some(old) = replaced {
            self.bytes -= old;
        }
        self.bytes += added;

        replaced
    }

    // == Remove ==
    /// Removes `key` without touching the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        let removed = self.entries.pop(key)?;
        self.bytes -= removed.len() as u64;
        Some(removed)
    }

    // == Pop LRU ==
    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(String, Vec<u8>)> {
        let (key, payload) = self.entries.pop_lru()?;
        self.bytes -= payload.len() as u64;
        Some((key, payload))
    }

    // == Clear ==
    /// Drops every entry and returns the number of bytes released.
    pub fn clear(&mut self) -> u64 {
        let released = self.bytes;
        self.entries.clear();
        self.bytes = 0;
        released
    }

    /// Checks for `key` without promoting it.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|(k, _)| k.clone()).collect();
        keys.reverse();
        keys
    }

    /// Running byte total.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Recomputes the byte total from the stored payloads.
    pub fn recount(&self) -> u64 {
        self.entries.iter().map(|(_, v)| v.len() as u64).sum()
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}
