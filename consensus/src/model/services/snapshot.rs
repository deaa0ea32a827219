use std::sync::Arc;

use arc_swap::ArcSwap;
use tangle_consensus_core::txhash;
use tangle_consensus_core::TxHashSet;
use tangle_hashes::Hash;

/// An immutable view of the snapshot horizon below which ancestry is not tracked.
///
/// Solid entry points are hashes at the horizon which solidity walks treat as
/// solid roots with height zero. The null hash is always an entry point since
/// genesis-attached transactions reference it as both parents.
#[derive(Clone, Debug)]
pub struct Snapshot {
    solid_entry_points: TxHashSet,
}

impl Snapshot {
    pub fn new(solid_entry_points: impl IntoIterator<Item = Hash>) -> Self {
        let mut solid_entry_points: TxHashSet = solid_entry_points.into_iter().collect();
        solid_entry_points.insert(txhash::NONE);
        Self { solid_entry_points }
    }

    pub fn is_solid_entry_point(&self, hash: Hash) -> bool {
        self.solid_entry_points.contains(&hash)
    }

    pub fn solid_entry_points(&self) -> &TxHashSet {
        &self.solid_entry_points
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new([])
    }
}

/// Shared provider of the current [`Snapshot`].
///
/// Workers pin the snapshot once per round via `current` so a concurrent
/// replacement cannot shift the entry-point horizon mid-walk.
pub struct SnapshotProvider {
    current: ArcSwap<Snapshot>,
}

impl SnapshotProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { current: ArcSwap::from_pointee(snapshot) }
    }

    /// Returns the current snapshot. The returned `Arc` remains valid across
    /// concurrent `replace` calls.
    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn replace(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }
}

impl Default for SnapshotProvider {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_entry_points() {
        let snapshot = Snapshot::new([7.into()]);
        assert!(snapshot.is_solid_entry_point(7.into()));
        assert!(snapshot.is_solid_entry_point(txhash::NONE));
        assert!(!snapshot.is_solid_entry_point(8.into()));
    }

    #[test]
    fn test_provider_pinning() {
        let provider = SnapshotProvider::default();
        let pinned = provider.current();
        provider.replace(Snapshot::new([3.into()]));
        // The pinned view is unaffected by the replacement
        assert!(!pinned.is_solid_entry_point(3.into()));
        assert!(provider.current().is_solid_entry_point(3.into()));
    }
}
