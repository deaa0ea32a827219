pub mod config;
pub mod tx;
pub mod txhash;

use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasher, Hasher};
use tangle_hashes::Hash;

/// Map from transaction hash to V type
pub type TxHashMap<V> = HashMap<Hash, V, TxHasher>;

/// Same as `TxHashMap` but a `HashSet`.
pub type TxHashSet = HashSet<Hash, TxHasher>;

pub trait HashMapCustomHasher {
    fn new() -> Self;
    fn with_capacity(capacity: usize) -> Self;
}

impl<V> HashMapCustomHasher for TxHashMap<V> {
    #[inline(always)]
    fn new() -> Self {
        Self::with_hasher(TxHasher::new())
    }

    #[inline(always)]
    fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, TxHasher::new())
    }
}

impl HashMapCustomHasher for TxHashSet {
    #[inline(always)]
    fn new() -> Self {
        Self::with_hasher(TxHasher::new())
    }

    #[inline(always)]
    fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, TxHasher::new())
    }
}

/// A hasher relying on the keys already being uniformly distributed hashes: the
/// first bytes of the key are used as the map hash as is
#[derive(Default, Clone, Copy)]
pub struct TxHasher(u64);

impl TxHasher {
    #[inline(always)]
    pub fn new() -> Self {
        Self(0)
    }
}

impl Hasher for TxHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline(always)]
    fn write(&mut self, bytes: &[u8]) {
        let mut word = [0u8; 8];
        let len = bytes.len().min(8);
        word[..len].copy_from_slice(&bytes[..len]);
        self.0 = u64::from_le_bytes(word);
    }

    #[inline(always)]
    fn write_u64(&mut self, v: u64) {
        self.0 = v;
    }
}

impl BuildHasher for TxHasher {
    type Hasher = Self;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_hashed_collections() {
        let mut set = TxHashSet::new();
        assert!(set.insert(7.into()));
        assert!(!set.insert(7.into()));
        assert!(set.insert(8.into()));
        assert!(set.contains(&7.into()));

        let mut map: TxHashMap<u64> = TxHashMap::with_capacity(2);
        map.insert(7.into(), 1);
        map.insert(7.into(), 2);
        assert_eq!(map.get(&7.into()), Some(&2));
        assert_eq!(map.len(), 1);
    }
}
