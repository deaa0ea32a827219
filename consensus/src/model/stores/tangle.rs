use std::sync::Arc;

use tangle_consensus_core::tx::TxEntry;
use tangle_consensus_core::txhash::{TxHashExtensions, TxHashes};
use tangle_consensus_core::{HashMapCustomHasher, TxHashMap};
use tangle_hashes::Hash;

use super::errors::{StoreError, StoreResult};

/// Reader API for `TangleStore`.
pub trait TangleStoreReader {
    fn get(&self, hash: Hash) -> StoreResult<TxEntry>;

    /// Returns the hashes of all transactions referencing `hash` as trunk or branch.
    /// Unknown hashes yield an empty set since referenced-but-unseen hashes are legal.
    fn approvers(&self, hash: Hash) -> StoreResult<TxHashes>;

    fn has(&self, hash: Hash) -> StoreResult<bool>;

    /// Returns the count of entries in the store. To be used for tests only
    fn count(&self) -> StoreResult<usize>;
}

/// Low-level write API for `TangleStore`
pub trait TangleStore: TangleStoreReader {
    fn insert(&mut self, hash: Hash, trunk: Hash, branch: Hash) -> StoreResult<()>;
    fn set_solid(&mut self, hash: Hash, height: u64) -> StoreResult<()>;
}

/// An in-memory implementation of the `TangleStore` trait
pub struct MemoryTangleStore {
    entries: TxHashMap<TxEntry>,
    approvers_map: TxHashMap<TxHashes>,
}

impl MemoryTangleStore {
    pub fn new() -> Self {
        Self { entries: TxHashMap::new(), approvers_map: TxHashMap::new() }
    }

    fn append_approver(&mut self, parent: Hash, approver: Hash) {
        let approvers = self.approvers_map.entry(parent).or_default();
        if !approvers.contains(&approver) {
            Arc::make_mut(approvers).push(approver);
        }
    }
}

impl Default for MemoryTangleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TangleStoreReader for MemoryTangleStore {
    fn get(&self, hash: Hash) -> StoreResult<TxEntry> {
        match self.entries.get(&hash) {
            Some(entry) => Ok(*entry),
            None => Err(StoreError::KeyNotFound(hash)),
        }
    }

    fn approvers(&self, hash: Hash) -> StoreResult<TxHashes> {
        match self.approvers_map.get(&hash) {
            Some(approvers) => Ok(TxHashes::clone(approvers)),
            None => Ok(Default::default()),
        }
    }

    fn has(&self, hash: Hash) -> StoreResult<bool> {
        Ok(self.entries.contains_key(&hash))
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.entries.len())
    }
}

impl TangleStore for MemoryTangleStore {
    fn insert(&mut self, hash: Hash, trunk: Hash, branch: Hash) -> StoreResult<()> {
        if let Some(existing) = self.entries.get(&hash) {
            if !existing.is_placeholder() {
                return Err(StoreError::HashAlreadyExists(hash));
            }
        }
        // A placeholder left by an earlier reference is upgraded in place. Approver
        // edges registered against it remain valid.
        self.entries.insert(hash, TxEntry::new(trunk, branch));
        for parent in [trunk, branch] {
            if !parent.is_none() && !self.entries.contains_key(&parent) {
                self.entries.insert(parent, TxEntry::placeholder());
            }
            self.append_approver(parent, hash);
        }
        Ok(())
    }

    fn set_solid(&mut self, hash: Hash, height: u64) -> StoreResult<()> {
        match self.entries.get_mut(&hash) {
            Some(entry) => {
                if !entry.solid {
                    entry.solid = true;
                    entry.height = height;
                }
                Ok(())
            }
            None => Err(StoreError::KeyNotFound(hash)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stores::errors::StoreResultUnitExt;
    use tangle_consensus_core::txhash::NONE;

    #[test]
    fn test_memory_tangle_store() {
        test_tangle_store(MemoryTangleStore::new());
    }

    fn test_tangle_store<T: TangleStore>(mut store: T) {
        let attachments = [(2, 1, 1), (3, 1, 2), (4, 2, 3), (5, 3, 4)];
        for (hash, trunk, branch) in attachments {
            store.insert(hash.into(), trunk.into(), branch.into()).unwrap();
        }

        // 1 was only ever referenced, so it surfaced as a placeholder
        assert!(store.get(1.into()).unwrap().is_placeholder());
        let expected_approvers = [(1, vec![2, 3]), (2, vec![3, 4]), (3, vec![4, 5]), (4, vec![5]), (5, vec![])];
        for (hash, approvers) in expected_approvers {
            assert!(store.approvers(hash.into()).unwrap().iter().copied().eq(approvers.iter().copied().map(Hash::from)));
        }

        // The full transaction for 1 arrives and upgrades the placeholder in place
        store.insert(1.into(), NONE, NONE).unwrap();
        let entry = store.get(1.into()).unwrap();
        assert!(!entry.is_placeholder());
        assert!(entry.parents().iter().all(|parent| parent.is_none()));
        assert!(store.approvers(NONE).unwrap().iter().copied().eq([1].iter().copied().map(Hash::from)));
        assert!(store.approvers(1.into()).unwrap().iter().copied().eq([2, 3].iter().copied().map(Hash::from)));

        // Re-inserting a full transaction is rejected but tolerated via `idempotent`
        assert_eq!(store.insert(1.into(), NONE, NONE), Err(StoreError::HashAlreadyExists(1.into())));
        store.insert(1.into(), NONE, NONE).idempotent().unwrap();

        assert_eq!(store.count().unwrap(), 5);
        assert!(store.has(5.into()).unwrap());
        assert!(!store.has(9.into()).unwrap());

        store.set_solid(1.into(), 1).unwrap();
        assert!(store.get(1.into()).unwrap().solid);
        // Solidity is monotonic so the recorded height is final
        store.set_solid(1.into(), 7).unwrap();
        assert_eq!(store.get(1.into()).unwrap().height, 1);
        assert_eq!(store.set_solid(9.into(), 1), Err(StoreError::KeyNotFound(9.into())));
    }
}
