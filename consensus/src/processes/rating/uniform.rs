use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use tangle_consensus_core::TxHashSet;
use tangle_hashes::Hash;

use super::RatingCalculator;
use crate::model::services::snapshot::SnapshotProvider;
use crate::model::stores::errors::StoreResult;
use crate::model::stores::tangle::TangleStoreReader;

/// Rates every reachable transaction equally, for unbiased random walks.
///
/// Breadth-first forward traversal from the entry point; each reachable hash
/// appears exactly once in the output, the entry point included. Horizon
/// members are never descended.
#[derive(Clone)]
pub struct UniformRatingCalculator<T: TangleStoreReader> {
    tangle_store: Arc<RwLock<T>>,
    snapshot_provider: Arc<SnapshotProvider>,
}

impl<T: TangleStoreReader> UniformRatingCalculator<T> {
    pub fn new(tangle_store: Arc<RwLock<T>>, snapshot_provider: Arc<SnapshotProvider>) -> Self {
        Self { tangle_store, snapshot_provider }
    }
}

impl<T: TangleStoreReader> RatingCalculator for UniformRatingCalculator<T> {
    fn calculate(&self, entry_point: Hash) -> StoreResult<Vec<Hash>> {
        let snapshot = self.snapshot_provider.current();
        let mut rated = vec![entry_point];
        let mut visited = TxHashSet::from_iter([entry_point]);
        let mut queue = VecDeque::from([entry_point]);
        while let Some(hash) = queue.pop_front() {
            let approvers = self.tangle_store.read().approvers(hash)?;
            for approver in approvers.iter().copied() {
                if snapshot.is_solid_entry_point(approver) {
                    continue;
                }
                if visited.insert(approver) {
                    rated.push(approver);
                    queue.push_back(approver);
                }
            }
        }
        Ok(rated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::services::snapshot::Snapshot;
    use crate::model::stores::tangle::{MemoryTangleStore, TangleStore};

    fn build_tangle(attachments: &[(u64, u64, u64)], snapshot: Snapshot) -> UniformRatingCalculator<MemoryTangleStore> {
        let store = Arc::new(RwLock::new(MemoryTangleStore::new()));
        for (hash, trunk, branch) in attachments.iter().copied() {
            store.write().insert(hash.into(), trunk.into(), branch.into()).unwrap();
        }
        UniformRatingCalculator::new(store, Arc::new(SnapshotProvider::new(snapshot)))
    }

    #[test]
    fn test_forward_reachable_set() {
        // 1 is approved by 2 and 3, and 2 is approved by 4
        let calculator = build_tangle(&[(1, 0, 0), (2, 1, 1), (3, 1, 1), (4, 2, 2)], Snapshot::default());
        let mut rated = calculator.calculate(1.into()).unwrap();
        rated.sort();
        assert_eq!(rated, [1, 2, 3, 4].map(Hash::from).to_vec());

        // A hash with no approvers rates only itself
        assert_eq!(calculator.calculate(9.into()).unwrap(), vec![9.into()]);
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
}
