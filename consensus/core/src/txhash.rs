use std::sync::Arc;
use tangle_hashes::{Hash, HASH_SIZE};

pub type TxHashes = Arc<Vec<Hash>>;

/// `txhash::NONE` is the zero hash, used where no actual transaction is referenced.
/// Transactions issued at the origin of the tangle carry it as their parent
/// reference, and every snapshot horizon contains it
pub const NONE: Hash = Hash::from_bytes([0u8; HASH_SIZE]);

pub trait TxHashExtensions {
    fn is_none(&self) -> bool;
}

impl TxHashExtensions for Hash {
    fn is_none(&self) -> bool {
        self.eq(&NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_hash() {
        assert!(NONE.is_none());
        assert!(!Hash::from(7u64).is_none());
        assert_eq!(NONE, 0.into());
    }
}
