use crate::txhash;
use serde::{Deserialize, Serialize};
use tangle_hashes::Hash;

/// Role-specific aliases over the raw hash type. All of them share the in-memory
/// representation and hashing behavior and are interchangeable as map keys; the
/// distinct names only document which entity a hash identifies.
pub type TransactionHash = Hash;
pub type BundleHash = Hash;
pub type TagHash = Hash;
pub type AddressHash = Hash;

/// Distinguishes transactions whose content was fully received from hashes known
/// only through a child's parent reference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    Full,
    Placeholder,
}

/// A tangle vertex record: the two parent references plus local solidification state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEntry {
    /// The first parent (trunk) reference
    pub trunk: Hash,

    /// The second parent (branch) reference
    pub branch: Hash,

    pub kind: TxKind,

    /// Whether the full ancestry of this transaction down to the snapshot horizon
    /// is locally present. Monotonic: once set it is never reverted
    pub solid: bool,

    /// Longest-path distance from the snapshot horizon. Meaningful only once solid
    pub height: u64,
}

impl TxEntry {
    pub fn new(trunk: Hash, branch: Hash) -> Self {
        Self { trunk, branch, kind: TxKind::Full, solid: false, height: 0 }
    }

    /// An entry for a hash referenced as a parent before its content arrived
    pub fn placeholder() -> Self {
        Self { trunk: txhash::NONE, branch: txhash::NONE, kind: TxKind::Placeholder, solid: false, height: 0 }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, TxKind::Placeholder)
    }

    /// The two parent references in trunk, branch order
    pub fn parents(&self) -> [Hash; 2] {
        [self.trunk, self.branch]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_basics() {
        let entry = TxEntry::new(1.into(), 2.into());
        assert_eq!(entry.parents(), [1.into(), 2.into()]);
        assert!(!entry.is_placeholder());
        assert!(!entry.solid);

        let placeholder = TxEntry::placeholder();
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.parents(), [txhash::NONE, txhash::NONE]);
    }
}
