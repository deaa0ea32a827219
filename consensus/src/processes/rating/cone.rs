use std::sync::Arc;

use parking_lot::RwLock;
use tangle_consensus_core::txhash::TxHashes;
use tangle_consensus_core::{HashMapCustomHasher, TxHashMap, TxHashSet};
use tangle_hashes::Hash;

use super::RatingCalculator;
use crate::model::services::snapshot::{Snapshot, SnapshotProvider};
use crate::model::stores::errors::StoreResult;
use crate::model::stores::tangle::TangleStoreReader;

/// Rates the future cone of the entry point via a depth-first walk.
///
/// The output matches the uniform variant, a flat forward-reachable set.
/// The variant differs in traversal shape and in memoizing approver lookups
/// within a call: a hash stacked along several paths is popped more than
/// once, and every pop past the first resolves its approvers against the
/// memo instead of the store.
#[derive(Clone)]
pub struct ConeRatingCalculator<T: TangleStoreReader> {
    tangle_store: Arc<RwLock<T>>,
    snapshot_provider: Arc<SnapshotProvider>,
}

impl<T: TangleStoreReader> ConeRatingCalculator<T> {
    pub fn new(tangle_store: Arc<RwLock<T>>, snapshot_provider: Arc<SnapshotProvider>) -> Self {
        Self { tangle_store, snapshot_provider }
    }

    /// Approvers of `hash` with horizon members filtered out, memoized per call.
    fn filtered_approvers(&self, hash: Hash, snapshot: &Snapshot, cache: &mut TxHashMap<TxHashes>) -> StoreResult<TxHashes> {
        if let Some(approvers) = cache.get(&hash) {
            return Ok(TxHashes::clone(approvers));
        }
        let approvers = self.tangle_store.read().approvers(hash)?;
        let filtered: TxHashes = Arc::new(approvers.iter().copied().filter(|approver| !snapshot.is_solid_entry_point(*approver)).collect());
        cache.insert(hash, TxHashes::clone(&filtered));
        Ok(filtered)
    }
}

impl<T: TangleStoreReader> RatingCalculator for ConeRatingCalculator<T> {
    fn calculate(&self, entry_point: Hash) -> StoreResult<Vec<Hash>> {
        let snapshot = self.snapshot_provider.current();
        let mut cache = TxHashMap::new();
        let mut rated = Vec::new();
        let mut visited = TxHashSet::new();
        let mut stack = vec![entry_point];
        while let Some(hash) = stack.pop() {
            // Resolved before the dedup check, so a repeat pop is served by the memo
            let approvers = self.filtered_approvers(hash, &snapshot, &mut cache)?;
            if !visited.insert(hash) {
                continue;
            }
            rated.push(hash);
            for approver in approvers.iter().copied() {
                if !visited.contains(&approver) {
                    stack.push(approver);
                }
            }
        }
        Ok(rated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stores::tangle::{MemoryTangleStore, TangleStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tangle_consensus_core::tx::TxEntry;

    fn build_tangle(attachments: &[(u64, u64, u64)], snapshot: Snapshot) -> ConeRatingCalculator<MemoryTangleStore> {
        let store = Arc::new(RwLock::new(MemoryTangleStore::new()));
        for (hash, trunk, branch) in attachments.iter().copied() {
            store.write().insert(hash.into(), trunk.into(), branch.into()).unwrap();
        }
        ConeRatingCalculator::new(store, Arc::new(SnapshotProvider::new(snapshot)))
    }

    /// Counts approver reads so memo hits are observable from the outside.
    struct LookupCountingStore {
        store: MemoryTangleStore,
        approver_lookups: AtomicUsize,
    }

    impl LookupCountingStore {
        fn new() -> Self {
            Self { store: MemoryTangleStore::new(), approver_lookups: AtomicUsize::new(0) }
        }
    }

    impl TangleStoreReader for LookupCountingStore {
        fn get(&self, hash: Hash) -> StoreResult<TxEntry> {
            self.store.get(hash)
        }

        fn approvers(&self, hash: Hash) -> StoreResult<TxHashes> {
            self.approver_lookups.fetch_add(1, Ordering::Relaxed);
            self.store.approvers(hash)
        }

        fn has(&self, hash: Hash) -> StoreResult<bool> {
            self.store.has(hash)
        }

        fn count(&self) -> StoreResult<usize> {
            self.store.count()
        }
    }

    #[test]
    fn test_forward_reachable_set() {
        // 1 is approved by 2 and 3, and 2 is approved by 4
        let calculator = build_tangle(&[(1, 0, 0), (2, 1, 1), (3, 1, 1), (4, 2, 2)], Snapshot::default());
        let mut rated = calculator.calculate(1.into()).unwrap();
        rated.sort();
        assert_eq!(rated, [1, 2, 3, 4].map(Hash::from).to_vec());
    }

    #[test]
    fn test_diamond_counted_once() {
        let calculator = build_tangle(&[(1, 0, 0), (2, 1, 1), (3, 1, 2)], Snapshot::default());
        let mut rated = calculator.calculate(1.into()).unwrap();
        rated.sort();
        assert_eq!(rated, [1, 2, 3].map(Hash::from).to_vec());
    }

    #[test]
    fn test_horizon_members_excluded() {
        let calculator = build_tangle(&[(1, 0, 0), (2, 1, 1), (3, 1, 2)], Snapshot::new([3.into()]));
        let mut rated = calculator.calculate(1.into()).unwrap();
        rated.sort();
        assert_eq!(rated, [1, 2].map(Hash::from).to_vec());
    }

    #[test]
    fn test_repeat_pops_served_by_memo() {
        // 4 approves both 1 and 3, and 6 approves both 4 and 5, so each is
        // stacked twice and popped twice
        let store = Arc::new(RwLock::new(LookupCountingStore::new()));
        for (hash, trunk, branch) in [(4, 1, 3), (3, 1, 1), (6, 4, 5), (5, 4, 4)] {
            store.write().store.insert(hash.into(), trunk.into(), branch.into()).unwrap();
        }
        let calculator = ConeRatingCalculator::new(store.clone(), Arc::new(SnapshotProvider::new(Snapshot::default())));
        let mut rated = calculator.calculate(1.into()).unwrap();
        rated.sort();
        assert_eq!(rated, [1, 3, 4, 5, 6].map(Hash::from).to_vec());
        // One store read per rated hash; the repeat pops of 4 and 6 hit the memo
        assert_eq!(store.read().approver_lookups.load(Ordering::Relaxed), rated.len());
    }
}
